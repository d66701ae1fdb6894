//! # Shared Error Handling Module
//!
//! Error types for starting and running the Harvest service.
//!
//! ## Error Categories
//!
//! - **Configuration Errors**: Invalid startup configuration
//! - **Network Errors**: Bind failures and listener errors
//! - **System Errors**: Unexpected internal failures
//!
//! Inference failures that occur per request live in
//! `harvest_inference::InferenceError`; this type covers everything around
//! the inference runtime.

use std::net::AddrParseError;
use thiserror::Error;

/// Result type alias for Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Error types for Harvest service operations
///
/// Each variant carries enough context to produce an actionable log line.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Configuration validation errors
    ///
    /// Raised during startup when the supplied configuration is unusable.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// Optional source error for additional context
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Network-level errors such as failing to bind the listener
    #[error("Network error on {target}: {message}")]
    Network {
        /// Address involved in the failure
        target: String,
        /// Descriptive error message
        message: String,
        /// Underlying network error for debugging
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal failure
        message: String,
        /// Source error for debugging
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl HarvestError {
    /// Creates a configuration error with context
    ///
    /// # Examples
    ///
    /// ```rust
    /// use harvest_shared::error::HarvestError;
    ///
    /// let error = HarvestError::configuration("Invalid listen address", None);
    /// ```
    pub fn configuration(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source,
        }
    }

    /// Creates a network error with target and context
    ///
    /// # Examples
    ///
    /// ```rust
    /// use harvest_shared::error::HarvestError;
    ///
    /// let error = HarvestError::network("127.0.0.1:5000", "Address in use", None);
    /// ```
    pub fn network(
        target: impl Into<String>,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            target: target.into(),
            message: message.into(),
            source,
        }
    }

    /// Creates an internal error with source context
    pub fn internal(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source,
        }
    }
}

/// Conversion from address parsing errors
impl From<AddrParseError> for HarvestError {
    fn from(err: AddrParseError) -> Self {
        HarvestError::configuration(
            format!("Invalid network address: {}", err),
            Some(Box::new(err)),
        )
    }
}
