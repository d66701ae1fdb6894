//! TorchScript backend for the native training format
//!
//! Uses libtorch through `tch` behind the `torch` feature. The exported
//! module takes the same `(1, 299, 299, 3)` NHWC batch as the ONNX graph.

use super::ClassifierBackend;
use crate::artifact::FormatKind;
use crate::error::{InferenceError, InferenceResult};
use std::path::Path;

#[cfg(feature = "torch")]
mod inner {
    use super::*;
    use crate::preprocess::InputTensor;
    use std::sync::Mutex;
    use tch::{CModule, Device, Kind, Tensor};

    /// A TorchScript module on the CPU
    ///
    /// `CModule` is not `Sync`, so forward passes are serialized.
    pub struct TorchBackend {
        module: Mutex<CModule>,
    }

    impl TorchBackend {
        /// Loads the scripted module onto the CPU in eval mode
        pub fn load(path: &Path) -> InferenceResult<Self> {
            let mut module = CModule::load_on_device(path, Device::Cpu).map_err(|e| {
                InferenceError::backend_load(FormatKind::NativeTraining, path, e)
            })?;
            module.set_eval();

            Ok(Self {
                module: Mutex::new(module),
            })
        }
    }

    impl ClassifierBackend for TorchBackend {
        fn kind(&self) -> FormatKind {
            FormatKind::NativeTraining
        }

        fn invoke(&self, input: &InputTensor) -> InferenceResult<Vec<f32>> {
            input.ensure_shape(&self.input_spec())?;

            let dims: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
            let tensor = Tensor::from_slice(input.data()).reshape(dims);

            let module = self
                .module
                .lock()
                .map_err(|e| InferenceError::inference_failure(format!("module lock poisoned: {e}")))?;

            let output = tch::no_grad(|| module.forward_ts(&[tensor]))
                .map_err(InferenceError::inference_failure)?;

            Vec::<f32>::try_from(&output.to_kind(Kind::Float).flatten(0, -1))
                .map_err(InferenceError::inference_failure)
        }
    }
}

#[cfg(feature = "torch")]
pub use inner::TorchBackend;

/// Opens a `.pt` artifact
#[cfg(feature = "torch")]
pub fn open(path: &Path) -> InferenceResult<Box<dyn ClassifierBackend>> {
    Ok(Box::new(TorchBackend::load(path)?))
}

/// Opens a `.pt` artifact
#[cfg(not(feature = "torch"))]
pub fn open(_path: &Path) -> InferenceResult<Box<dyn ClassifierBackend>> {
    Err(InferenceError::RuntimeUnavailable {
        kind: FormatKind::NativeTraining,
        feature: FormatKind::NativeTraining.feature(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vegetable_classification.pt");
        std::fs::write(&path, b"not a torchscript archive").unwrap();

        let err = open(&path).err().unwrap();
        assert!(matches!(
            err,
            InferenceError::BackendLoad {
                kind: FormatKind::NativeTraining,
                ..
            } | InferenceError::RuntimeUnavailable {
                kind: FormatKind::NativeTraining,
                ..
            }
        ));
    }
}
