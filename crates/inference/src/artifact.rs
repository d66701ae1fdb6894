//! Model artifact discovery
//!
//! The service ships a trained classifier in up to three serialized
//! representations next to each other in one directory. This module knows
//! their well-known file names and reports which ones exist.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default file stem shared by all artifact representations
pub const DEFAULT_ARTIFACT_STEM: &str = "vegetable_classification";

/// Serialized model representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatKind {
    /// Portable graph format (ONNX), executed by ONNX Runtime
    PortableGraph,
    /// Mobile-optimized format (TensorFlow Lite flatbuffer)
    MobileOptimized,
    /// Native training format (TorchScript module), needs libtorch
    NativeTraining,
}

impl FormatKind {
    /// Load priority: lighter runtimes first, the native format last
    pub const PRIORITY: [FormatKind; 3] = [
        FormatKind::PortableGraph,
        FormatKind::MobileOptimized,
        FormatKind::NativeTraining,
    ];

    /// File extension of the artifact, without the dot
    pub const fn extension(self) -> &'static str {
        match self {
            Self::PortableGraph => "onnx",
            Self::MobileOptimized => "tflite",
            Self::NativeTraining => "pt",
        }
    }

    /// Name reported by the health endpoint
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::PortableGraph => "ONNX",
            Self::MobileOptimized => "TFLite",
            Self::NativeTraining => "TorchScript",
        }
    }

    /// Cargo feature that compiles the runtime for this format
    pub const fn feature(self) -> &'static str {
        match self {
            Self::PortableGraph => "onnx",
            Self::MobileOptimized => "tflite",
            Self::NativeTraining => "torch",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A serialized model file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    path: PathBuf,
    kind: FormatKind,
}

impl ModelArtifact {
    /// Creates an artifact record; existence is not checked here
    pub fn new(path: impl Into<PathBuf>, kind: FormatKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Path of the artifact file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Representation stored in the file
    pub const fn kind(&self) -> FormatKind {
        self.kind
    }
}

/// The artifacts present in a model directory
///
/// Holds at most one artifact per [`FormatKind`]; iteration follows
/// [`FormatKind::PRIORITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    slots: [Option<ModelArtifact>; 3],
}

impl ArtifactSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an artifact, replacing any previous one of the same kind
    pub fn insert(&mut self, artifact: ModelArtifact) {
        let idx = Self::slot(artifact.kind());
        self.slots[idx] = Some(artifact);
    }

    /// Returns the artifact of the given kind, if present
    pub fn get(&self, kind: FormatKind) -> Option<&ModelArtifact> {
        self.slots[Self::slot(kind)].as_ref()
    }

    /// Returns true if the given kind is present
    pub fn contains(&self, kind: FormatKind) -> bool {
        self.get(kind).is_some()
    }

    /// Iterates present artifacts in load priority order
    pub fn iter(&self) -> impl Iterator<Item = &ModelArtifact> {
        self.slots.iter().flatten()
    }

    /// Number of artifacts present
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true when no artifact was found
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    fn slot(kind: FormatKind) -> usize {
        match kind {
            FormatKind::PortableGraph => 0,
            FormatKind::MobileOptimized => 1,
            FormatKind::NativeTraining => 2,
        }
    }
}

impl FromIterator<ModelArtifact> for ArtifactSet {
    fn from_iter<I: IntoIterator<Item = ModelArtifact>>(iter: I) -> Self {
        let mut set = Self::new();
        for artifact in iter {
            set.insert(artifact);
        }
        set
    }
}

/// Finds model artifacts by their well-known names
///
/// Presence is a plain filesystem check: nothing is opened or validated.
/// A missing directory simply yields an empty set.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    stem: String,
}

impl ArtifactLocator {
    /// Creates a locator for `<stem>.onnx`, `<stem>.tflite` and `<stem>.pt`
    pub fn new(stem: impl Into<String>) -> Self {
        Self { stem: stem.into() }
    }

    /// The file name used for an artifact kind
    pub fn file_name(&self, kind: FormatKind) -> String {
        format!("{}.{}", self.stem, kind.extension())
    }

    /// Scans `base_dir` for the three artifact files
    pub fn locate(&self, base_dir: &Path) -> ArtifactSet {
        FormatKind::PRIORITY
            .iter()
            .filter_map(|&kind| {
                let path = base_dir.join(self.file_name(kind));
                if path.is_file() {
                    debug!(kind = %kind, path = %path.display(), "Found model artifact");
                    Some(ModelArtifact::new(path, kind))
                } else {
                    debug!(kind = %kind, path = %path.display(), "Model artifact not present");
                    None
                }
            })
            .collect()
    }
}

impl Default for ArtifactLocator {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACT_STEM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_file_names() {
        let locator = ArtifactLocator::default();
        assert_eq!(
            locator.file_name(FormatKind::PortableGraph),
            "vegetable_classification.onnx"
        );
        assert_eq!(
            locator.file_name(FormatKind::MobileOptimized),
            "vegetable_classification.tflite"
        );
        assert_eq!(
            locator.file_name(FormatKind::NativeTraining),
            "vegetable_classification.pt"
        );
    }

    #[test]
    fn test_locate_missing_directory_is_empty() {
        let locator = ArtifactLocator::default();
        let set = locator.locate(Path::new("/nonexistent/harvest/models"));
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_locate_subset() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("vegetable_classification.pt"), b"x").unwrap();
        fs::write(dir.path().join("vegetable_classification.tflite"), b"x").unwrap();

        let set = ArtifactLocator::default().locate(dir.path());
        assert_eq!(set.len(), 2);
        assert!(!set.contains(FormatKind::PortableGraph));
        assert!(set.contains(FormatKind::MobileOptimized));
        assert!(set.contains(FormatKind::NativeTraining));

        let kinds: Vec<_> = set.iter().map(ModelArtifact::kind).collect();
        assert_eq!(
            kinds,
            vec![FormatKind::MobileOptimized, FormatKind::NativeTraining]
        );
    }

    #[test]
    fn test_directory_with_artifact_name_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("vegetable_classification.onnx")).unwrap();

        let set = ArtifactLocator::default().locate(dir.path());
        assert!(set.is_empty());
    }

    #[test]
    fn test_format_kind_names() {
        assert_eq!(FormatKind::PortableGraph.to_string(), "ONNX");
        assert_eq!(FormatKind::MobileOptimized.to_string(), "TFLite");
        assert_eq!(FormatKind::NativeTraining.to_string(), "TorchScript");
    }
}
