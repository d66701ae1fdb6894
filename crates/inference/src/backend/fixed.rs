//! Deterministic backend for tests
//!
//! Only compiled for unit tests or with the `test-util` feature; the runtime
//! factory never constructs it.

use super::ClassifierBackend;
use crate::artifact::FormatKind;
use crate::error::{InferenceError, InferenceResult};
use crate::preprocess::{InputSpec, InputTensor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Returns a configured score vector for every input
#[derive(Debug)]
pub struct FixedScoresBackend {
    kind: FormatKind,
    scores: Vec<f32>,
    failure: Option<String>,
    invocations: AtomicUsize,
    last_shape: Mutex<Option<[usize; 4]>>,
}

impl FixedScoresBackend {
    /// Backend of `kind` that always returns `scores`
    pub fn new(kind: FormatKind, scores: Vec<f32>) -> Self {
        Self {
            kind,
            scores,
            failure: None,
            invocations: AtomicUsize::new(0),
            last_shape: Mutex::new(None),
        }
    }

    /// Backend whose scores are one-hot at `class_index` over `classes`
    pub fn one_hot(kind: FormatKind, classes: usize, class_index: usize) -> Self {
        let mut scores = vec![0.0; classes];
        if let Some(slot) = scores.get_mut(class_index) {
            *slot = 1.0;
        }
        Self::new(kind, scores)
    }

    /// Backend that fails every invocation with `reason`
    pub fn failing(kind: FormatKind, reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::new(kind, Vec::new())
        }
    }

    /// Number of completed or attempted forward passes
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Shape of the most recent input that passed the shape check
    pub fn last_shape(&self) -> Option<[usize; 4]> {
        self.last_shape.lock().ok().and_then(|guard| *guard)
    }
}

impl ClassifierBackend for FixedScoresBackend {
    fn kind(&self) -> FormatKind {
        self.kind
    }

    fn input_spec(&self) -> InputSpec {
        InputSpec::for_kind(self.kind)
    }

    fn invoke(&self, input: &InputTensor) -> InferenceResult<Vec<f32>> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        input.ensure_shape(&self.input_spec())?;

        if let Ok(mut last) = self.last_shape.lock() {
            *last = Some(input.shape());
        }

        match &self.failure {
            Some(reason) => Err(InferenceError::inference_failure(reason)),
            None => Ok(self.scores.clone()),
        }
    }
}
