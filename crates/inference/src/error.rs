//! Error types for the Harvest inference runtime

use crate::artifact::FormatKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for inference operations
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Errors raised while loading a backend or serving a prediction
///
/// Load-time variants (`RuntimeUnavailable`, `BackendLoad`) are non-fatal:
/// the loader logs them and moves on to the next artifact. Per-request
/// variants are turned into a caller-visible message with
/// [`InferenceError::user_message`].
#[derive(Error, Debug)]
pub enum InferenceError {
    /// No backend was loaded at startup; permanent until restart
    #[error("No classification model is loaded")]
    ModelUnavailable,

    /// The upload could not be decoded into a non-empty RGB image
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// The tensor does not have the shape the backend was built for
    #[error("Input shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Shape declared by the backend's input contract
        expected: [usize; 4],
        /// Shape that was supplied
        actual: Vec<usize>,
    },

    /// The backend failed while executing the forward pass
    #[error("Inference failed: {0}")]
    InferenceFailure(String),

    /// The runtime for this format was not compiled into the binary
    #[error("{kind} runtime is not available (rebuild with the '{feature}' feature)")]
    RuntimeUnavailable {
        /// Format whose runtime is missing
        kind: FormatKind,
        /// Cargo feature that enables it
        feature: &'static str,
    },

    /// The runtime rejected the artifact
    #[error("Failed to load {kind} model from {}: {reason}", .path.display())]
    BackendLoad {
        /// Format that was being loaded
        kind: FormatKind,
        /// Artifact path
        path: PathBuf,
        /// Runtime error message
        reason: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
}

impl InferenceError {
    /// Creates a load error for an artifact
    pub fn backend_load(kind: FormatKind, path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::BackendLoad {
            kind,
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an execution error from any displayable runtime error
    pub fn inference_failure(reason: impl ToString) -> Self {
        Self::InferenceFailure(reason.to_string())
    }

    /// True for errors that concern a single request rather than the service
    pub const fn is_request_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedImage(_) | Self::ShapeMismatch { .. } | Self::InferenceFailure(_)
        )
    }

    /// Message rendered to the caller in place of a label
    pub fn user_message(&self) -> String {
        match self {
            Self::ModelUnavailable => {
                "⚠️ Model not loaded! Please upload a trained model.".to_string()
            }
            Self::UnsupportedImage(reason) => {
                format!("❌ Error: Unsupported image ({reason})")
            }
            Self::ShapeMismatch { .. } | Self::InferenceFailure(_) => {
                format!("❌ Error: Unable to make prediction ({self})")
            }
            _ => format!("❌ Error: {self}"),
        }
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value provided
    #[error("Invalid value for {field}: {value} (reason: {reason})")]
    InvalidValue {
        /// Configuration field name
        field: String,
        /// Invalid value provided
        value: String,
        /// Reason why value is invalid
        reason: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

impl From<validator::ValidationErrors> for ConfigError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map_or_else(|| e.code.to_string(), ToString::to_string);
                    format!("{field}: {message}")
                })
            })
            .collect();
        messages.sort();
        Self::ValidationFailed(messages.join(", "))
    }
}

impl From<validator::ValidationErrors> for InferenceError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Configuration(err.into())
    }
}
