//! TensorFlow Lite backend for the mobile-optimized format
//!
//! Executed with tract behind the `tflite` feature. The optimized plan is
//! immutable once built, so concurrent requests run without a lock.

use super::ClassifierBackend;
use crate::artifact::FormatKind;
use crate::error::{InferenceError, InferenceResult};
use std::path::Path;

#[cfg(feature = "tflite")]
mod inner {
    use super::*;
    use crate::preprocess::InputTensor;
    use tract_core::prelude::*;

    /// A flatbuffer model compiled into a tract plan
    pub struct TfliteBackend {
        plan: TypedRunnableModel<TypedModel>,
    }

    impl TfliteBackend {
        /// Parses, optimizes and plans the model
        pub fn load(path: &Path) -> InferenceResult<Self> {
            let load_err =
                |e: TractError| InferenceError::backend_load(FormatKind::MobileOptimized, path, e);

            let plan = tract_tflite::tflite()
                .model_for_path(path)
                .and_then(|model| model.into_optimized())
                .and_then(|model| model.into_runnable())
                .map_err(load_err)?;

            Ok(Self { plan })
        }
    }

    impl ClassifierBackend for TfliteBackend {
        fn kind(&self) -> FormatKind {
            FormatKind::MobileOptimized
        }

        fn invoke(&self, input: &InputTensor) -> InferenceResult<Vec<f32>> {
            input.ensure_shape(&self.input_spec())?;

            let tensor = Tensor::from_shape(&input.shape(), input.data())
                .map_err(InferenceError::inference_failure)?;

            let outputs = self
                .plan
                .run(tvec!(tensor.into()))
                .map_err(InferenceError::inference_failure)?;

            let scores = outputs
                .first()
                .ok_or_else(|| InferenceError::inference_failure("model produced no outputs"))?
                .as_slice::<f32>()
                .map_err(InferenceError::inference_failure)?;

            Ok(scores.to_vec())
        }
    }
}

#[cfg(feature = "tflite")]
pub use inner::TfliteBackend;

/// Opens a `.tflite` artifact
#[cfg(feature = "tflite")]
pub fn open(path: &Path) -> InferenceResult<Box<dyn ClassifierBackend>> {
    Ok(Box::new(TfliteBackend::load(path)?))
}

/// Opens a `.tflite` artifact
#[cfg(not(feature = "tflite"))]
pub fn open(_path: &Path) -> InferenceResult<Box<dyn ClassifierBackend>> {
    Err(InferenceError::RuntimeUnavailable {
        kind: FormatKind::MobileOptimized,
        feature: FormatKind::MobileOptimized.feature(),
    })
}
