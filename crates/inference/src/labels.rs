//! Score vector to class label mapping

use serde::Serialize;
use tracing::warn;

/// Label returned when the winning index has no entry in the table
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Class names of the vegetable classifier, indexed by model output position
pub const CLASS_LABELS: [&str; 15] = [
    "Bean",
    "Bitter_Gourd",
    "Bottle_Gourd",
    "Brinjal",
    "Broccoli",
    "Cabbage",
    "Capsicum",
    "Carrot",
    "Cauliflower",
    "Cucumber",
    "Papaya",
    "Potato",
    "Pumpkin",
    "Radish",
    "Tomato",
];

/// Index of the largest score
///
/// Ties resolve to the lowest index and NaN never wins. Returns `None` for an
/// empty vector or one holding only NaN.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Outcome of mapping a score vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Class name, or [`UNKNOWN_LABEL`]
    pub label: String,
    /// Winning index, if the vector had one
    pub class_index: Option<usize>,
    /// Score at the winning index
    pub score: Option<f32>,
    /// True when the label table had no entry for the winning index
    pub out_of_range: bool,
}

/// Maps score vectors to human-readable labels
#[derive(Debug, Clone)]
pub struct LabelMapper {
    labels: Vec<String>,
}

impl LabelMapper {
    /// Creates a mapper over a custom label table
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of known classes
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the table has no classes
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label for the argmax of `scores`, or [`UNKNOWN_LABEL`]
    pub fn map_to_label(&self, scores: &[f32]) -> &str {
        match argmax(scores).and_then(|idx| self.labels.get(idx)) {
            Some(label) => label.as_str(),
            None => {
                self.warn_unknown(scores);
                UNKNOWN_LABEL
            }
        }
    }

    /// Full classification result for `scores`
    pub fn classify(&self, scores: &[f32]) -> Classification {
        let class_index = argmax(scores);
        let score = class_index.map(|idx| scores[idx]);

        match class_index.and_then(|idx| self.labels.get(idx)) {
            Some(label) => Classification {
                label: label.clone(),
                class_index,
                score,
                out_of_range: false,
            },
            None => {
                self.warn_unknown(scores);
                Classification {
                    label: UNKNOWN_LABEL.to_string(),
                    class_index,
                    score,
                    out_of_range: true,
                }
            }
        }
    }

    fn warn_unknown(&self, scores: &[f32]) {
        warn!(
            scores = scores.len(),
            classes = self.labels.len(),
            winner = ?argmax(scores),
            "Score vector does not map to a known class"
        );
    }
}

impl Default for LabelMapper {
    fn default() -> Self {
        Self::new(CLASS_LABELS)
    }
}
