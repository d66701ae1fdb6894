//! # Harvest Shared Library
//!
//! Shared utilities and types for the Harvest image classification service.
//! This crate provides the functionality used by both the inference runtime
//! and the HTTP backend: error handling, CLI option groups, metrics
//! collection and model path resolution.
//!
//! ## Features
//!
//! - **Error Handling**: Structured error types with HTTP status mapping
//! - **Metrics Collection**: Lock-free prediction counters
//! - **CLI Options**: Reusable clap option groups for logging and metrics
//! - **Paths**: Home-directory aware model path resolution

pub mod cli;
pub mod error;
pub mod metrics;
pub mod paths;

pub mod test_utils;

// Re-export commonly used types for convenience
pub use cli::{LoggingOptions, MetricsOptions};
pub use error::{HarvestError, Result};
pub use metrics::{ActiveRequest, MetricsCollector, MetricsSnapshot};
pub use paths::{default_models_dir, expand_home_dir, resolve_models_path};
