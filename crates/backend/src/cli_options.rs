//! CLI options for the Harvest Backend
//!
//! Command-line interface for the classification server. Every flag can also
//! be set through a `HARVEST_*` environment variable.

use crate::server::ClassifierServer;
use crate::BackendConfig;
use clap::Parser;
use harvest_inference::{InferenceService, ModelConfig, RuntimeBackendFactory};
use harvest_shared::{HarvestError, LoggingOptions, MetricsOptions, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Harvest Backend - image classification server
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct BackendCliOptions {
    /// Address to listen on
    #[arg(
        short,
        long,
        default_value = "127.0.0.1:5000",
        env = "HARVEST_LISTEN_ADDR"
    )]
    pub listen_addr: SocketAddr,

    /// Directory containing the model artifacts
    #[arg(short, long, default_value = "./models", env = "HARVEST_MODEL_DIR")]
    pub model_dir: String,

    /// File stem shared by the artifacts (<stem>.onnx, <stem>.tflite, <stem>.pt)
    #[arg(
        long,
        default_value = harvest_inference::DEFAULT_ARTIFACT_STEM,
        env = "HARVEST_MODEL_STEM"
    )]
    pub model_stem: String,

    /// Maximum accepted upload size in bytes
    #[arg(
        long,
        default_value_t = crate::config::DEFAULT_MAX_UPLOAD_BYTES,
        env = "HARVEST_MAX_UPLOAD_BYTES"
    )]
    pub max_upload_bytes: u64,

    /// Service name used in logs
    #[arg(long, default_value = "harvest-backend", env = "HARVEST_SERVICE_NAME")]
    pub service_name: String,

    #[command(flatten)]
    pub logging: LoggingOptions,

    #[command(flatten)]
    pub metrics: MetricsOptions,
}

impl BackendCliOptions {
    /// Run the backend server with the configured options
    ///
    /// Loads the model, then serves until Ctrl-C. A missing or unloadable
    /// model does not stop the server; it runs degraded.
    pub async fn run(self) -> Result<()> {
        let config = self.to_config()?;

        info!(
            service_name = %config.service_name,
            listen_addr = %config.listen_addr,
            model_dir = %config.model.model_dir,
            "Starting Harvest backend"
        );

        let model = config.model.clone();
        let service = tokio::task::spawn_blocking(move || {
            InferenceService::start(&model, &RuntimeBackendFactory)
        })
        .await
        .map_err(|e| HarvestError::internal("Model loading task failed", Some(Box::new(e))))?;
        info!(report = %service.load_report(), "Model load summary");

        ClassifierServer::new(Arc::new(service), &config)
            .start()
            .await
    }

    /// Convert CLI options to BackendConfig
    pub fn to_config(&self) -> Result<BackendConfig> {
        let config = BackendConfig {
            listen_addr: self.listen_addr,
            model: ModelConfig {
                model_dir: self.model_dir.clone(),
                artifact_stem: self.model_stem.clone(),
            },
            max_upload_bytes: self.max_upload_bytes,
            enable_metrics: self.metrics.enable_metrics,
            service_name: self.service_name.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}
