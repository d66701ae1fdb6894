//! The classifier backend trait and the handle that owns the loaded backend

use crate::artifact::FormatKind;
use crate::error::InferenceResult;
use crate::preprocess::{InputSpec, InputTensor};
use std::fmt;
use std::path::{Path, PathBuf};

/// A loaded model that can score one preprocessed image
///
/// Implementations own their runtime session exclusively. `invoke` takes
/// `&self`; runtimes whose execution needs exclusive access serialize
/// internally.
pub trait ClassifierBackend: Send + Sync {
    /// Representation this backend executes
    fn kind(&self) -> FormatKind;

    /// Input contract; defaults to the per-format table
    fn input_spec(&self) -> InputSpec {
        InputSpec::for_kind(self.kind())
    }

    /// Runs a single forward pass and returns the per-class scores
    ///
    /// Fails with `ShapeMismatch` before execution if `input` does not match
    /// [`ClassifierBackend::input_spec`], and with `InferenceFailure` if the
    /// runtime errors.
    fn invoke(&self, input: &InputTensor) -> InferenceResult<Vec<f32>>;
}

/// The single backend selected at startup
pub struct BackendHandle {
    backend: Box<dyn ClassifierBackend>,
    source: Option<PathBuf>,
}

impl BackendHandle {
    /// Wraps a backend that was not loaded from a file
    pub fn new(backend: Box<dyn ClassifierBackend>) -> Self {
        Self {
            backend,
            source: None,
        }
    }

    /// Wraps a backend together with the artifact path it was loaded from
    pub fn with_source(backend: Box<dyn ClassifierBackend>, source: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            source: Some(source.into()),
        }
    }

    /// Representation of the loaded backend
    pub fn kind(&self) -> FormatKind {
        self.backend.kind()
    }

    /// Artifact path, if the backend came from disk
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The backend itself
    pub fn backend(&self) -> &dyn ClassifierBackend {
        self.backend.as_ref()
    }
}

impl fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendHandle")
            .field("kind", &self.kind())
            .field("source", &self.source)
            .finish()
    }
}
