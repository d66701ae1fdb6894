//! # Harvest Backend
//!
//! HTTP front end for the Harvest image classification runtime.
//!
//! ## Features
//!
//! - Upload page and `POST /result` prediction endpoint
//! - `/health` readiness payload with the loaded model format
//! - `/metrics` prediction counters
//! - Degraded startup: the server comes up even when no model loads

pub mod cli_options;
pub mod config;
pub mod health;
pub mod page;
pub mod server;

pub use cli_options::BackendCliOptions;
pub use config::BackendConfig;
pub use health::HealthResponse;
pub use server::ClassifierServer;
