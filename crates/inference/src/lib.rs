//! # Harvest Inference Runtime
//!
//! Image classification over interchangeable serialized model
//! representations. At startup the runtime looks for the model in up to
//! three formats, loads the first one that opens, and from then on serves
//! predictions through a single trait object.
//!
//! ## Formats
//!
//! | format | file | runtime | feature |
//! |---|---|---|---|
//! | ONNX | `<stem>.onnx` | ONNX Runtime (`ort`) | `onnx` (default) |
//! | TFLite | `<stem>.tflite` | tract | `tflite` |
//! | TorchScript | `<stem>.pt` | libtorch (`tch`) | `torch` |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use harvest_inference::{InferenceService, ModelConfig, RuntimeBackendFactory};
//!
//! let config = ModelConfig::from_env()?;
//! let service = InferenceService::start(&config, &RuntimeBackendFactory);
//!
//! let image = std::fs::read("carrot.jpg")?;
//! match service.predict(&image) {
//!     Ok(prediction) => println!("{}", prediction.label),
//!     Err(e) => println!("{}", e.user_message()),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rust_2018_idioms,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_possible_wrap,
    clippy::cast_possible_truncation,
    clippy::uninlined_format_args
)]

pub mod artifact;
pub mod backend;
pub mod config;
pub mod error;
pub mod labels;
pub mod loader;
pub mod preprocess;
pub mod service;

pub use artifact::{ArtifactLocator, ArtifactSet, FormatKind, ModelArtifact, DEFAULT_ARTIFACT_STEM};
pub use backend::{BackendHandle, ClassifierBackend};
#[cfg(any(test, feature = "test-util"))]
pub use backend::FixedScoresBackend;
pub use config::{ModelConfig, ModelConfigBuilder};
pub use error::{ConfigError, InferenceError, InferenceResult};
pub use labels::{argmax, Classification, LabelMapper, CLASS_LABELS, UNKNOWN_LABEL};
pub use loader::{
    BackendFactory, BackendLoader, LoadAttempt, LoadOutcome, LoadReport, RuntimeBackendFactory,
};
pub use preprocess::{preprocess, InputSpec, InputTensor, Normalization};
pub use service::{HealthReport, InferenceService, Prediction, ServiceState};

/// Current version of the Harvest inference runtime
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
