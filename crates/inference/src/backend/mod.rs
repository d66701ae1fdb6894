//! Classifier backends, one per model representation
//!
//! The loader picks exactly one of these at startup; afterwards every
//! request goes through the [`ClassifierBackend`] trait object.

pub mod traits;
pub use traits::{BackendHandle, ClassifierBackend};

pub mod onnx;
pub mod tflite;
pub mod torch;

#[cfg(any(test, feature = "test-util"))]
mod fixed;
#[cfg(any(test, feature = "test-util"))]
pub use fixed::FixedScoresBackend;

use crate::artifact::{FormatKind, ModelArtifact};
use crate::error::InferenceResult;

/// Opens an artifact with the runtime for its format
///
/// Formats whose runtime feature is disabled fail with `RuntimeUnavailable`.
pub fn open_runtime(artifact: &ModelArtifact) -> InferenceResult<Box<dyn ClassifierBackend>> {
    match artifact.kind() {
        FormatKind::PortableGraph => onnx::open(artifact.path()),
        FormatKind::MobileOptimized => tflite::open(artifact.path()),
        FormatKind::NativeTraining => torch::open(artifact.path()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;

    #[test]
    fn test_open_runtime_missing_file() {
        let artifact = ModelArtifact::new(
            "/nonexistent/vegetable_classification.pt",
            FormatKind::NativeTraining,
        );
        let err = open_runtime(&artifact).err().unwrap();
        assert!(matches!(
            err,
            InferenceError::BackendLoad { .. } | InferenceError::RuntimeUnavailable { .. }
        ));
    }

    #[cfg(not(feature = "torch"))]
    #[test]
    fn test_disabled_runtime_reports_feature() {
        let artifact = ModelArtifact::new("model.pt", FormatKind::NativeTraining);
        match open_runtime(&artifact).err().unwrap() {
            InferenceError::RuntimeUnavailable { kind, feature } => {
                assert_eq!(kind, FormatKind::NativeTraining);
                assert_eq!(feature, "torch");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
