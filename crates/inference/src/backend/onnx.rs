//! ONNX Runtime backend for the portable graph format
//!
//! With the `onnx` feature enabled, [`open`] builds an ONNX Runtime session.
//! Without it, [`open`] reports the runtime as unavailable so the loader can
//! fall through to the next artifact.

use super::ClassifierBackend;
use crate::artifact::FormatKind;
use crate::error::{InferenceError, InferenceResult};
use std::path::Path;

#[cfg(feature = "onnx")]
mod inner {
    use super::*;
    use crate::preprocess::InputTensor;
    use ort::{session::Session, value::Tensor};
    use std::sync::Mutex;
    use tracing::debug;

    /// A graph loaded into ONNX Runtime
    ///
    /// `Session::run` needs `&mut`, so the session sits behind a lock.
    pub struct OnnxBackend {
        session: Mutex<Session>,
        input_name: String,
        output_name: String,
    }

    impl OnnxBackend {
        /// Loads the graph and resolves its single input and output names
        pub fn load(path: &Path) -> InferenceResult<Self> {
            let load_err = |e: &dyn std::fmt::Display| {
                InferenceError::backend_load(FormatKind::PortableGraph, path, e)
            };

            let session = Session::builder()
                .map_err(|e| load_err(&e))?
                .commit_from_file(path)
                .map_err(|e| load_err(&e))?;

            let input_name = single_name("input", session.inputs().iter().map(|i| i.name()))
                .map_err(|e| load_err(&e))?;
            let output_name = single_name("output", session.outputs().iter().map(|o| o.name()))
                .map_err(|e| load_err(&e))?;

            debug!(input = %input_name, output = %output_name, "ONNX session ready");

            Ok(Self {
                session: Mutex::new(session),
                input_name,
                output_name,
            })
        }
    }

    impl ClassifierBackend for OnnxBackend {
        fn kind(&self) -> FormatKind {
            FormatKind::PortableGraph
        }

        fn invoke(&self, input: &InputTensor) -> InferenceResult<Vec<f32>> {
            input.ensure_shape(&self.input_spec())?;

            let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
            let tensor = Tensor::from_array((shape, input.data().to_vec()))
                .map_err(InferenceError::inference_failure)?;

            let mut session = self
                .session
                .lock()
                .map_err(|e| InferenceError::inference_failure(format!("session lock poisoned: {e}")))?;

            let outputs = session
                .run(ort::inputs![self.input_name.as_str() => tensor])
                .map_err(InferenceError::inference_failure)?;

            let (_, scores) = outputs[self.output_name.as_str()]
                .try_extract_tensor::<f32>()
                .map_err(InferenceError::inference_failure)?;

            Ok(scores.to_vec())
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxBackend;

/// The one name a classifier graph declares for `role`
#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
fn single_name<'a>(
    role: &str,
    mut names: impl ExactSizeIterator<Item = &'a str>,
) -> Result<String, String> {
    match (names.len(), names.next()) {
        (1, Some(name)) => Ok(name.to_string()),
        (count, _) => Err(format!(
            "graph declares {count} {role}s, expected exactly one"
        )),
    }
}

/// Opens a `.onnx` artifact
#[cfg(feature = "onnx")]
pub fn open(path: &Path) -> InferenceResult<Box<dyn ClassifierBackend>> {
    Ok(Box::new(OnnxBackend::load(path)?))
}

/// Opens a `.onnx` artifact
#[cfg(not(feature = "onnx"))]
pub fn open(_path: &Path) -> InferenceResult<Box<dyn ClassifierBackend>> {
    Err(InferenceError::RuntimeUnavailable {
        kind: FormatKind::PortableGraph,
        feature: FormatKind::PortableGraph.feature(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_name() {
        assert_eq!(
            single_name("input", ["input_1"].into_iter()),
            Ok("input_1".to_string())
        );

        let err = single_name("input", ["image", "mask"].into_iter()).unwrap_err();
        assert_eq!(err, "graph declares 2 inputs, expected exactly one");

        let err = single_name("output", std::iter::empty::<&str>()).unwrap_err();
        assert_eq!(err, "graph declares 0 outputs, expected exactly one");
    }

    #[test]
    fn test_open_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vegetable_classification.onnx");
        std::fs::write(&path, b"not a protobuf graph").unwrap();

        let err = open(&path).err().unwrap();
        if cfg!(feature = "onnx") {
            assert!(matches!(
                err,
                InferenceError::BackendLoad {
                    kind: FormatKind::PortableGraph,
                    ..
                }
            ));
        } else {
            assert!(matches!(err, InferenceError::RuntimeUnavailable { .. }));
        }
    }
}
