//! Backend configuration management

use harvest_inference::ModelConfig;
use harvest_shared::{HarvestError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::net::{Ipv4Addr, SocketAddr};

/// Default upload limit for `POST /result` (10 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Configuration for the backend server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    /// Address to bind the HTTP server to
    pub listen_addr: SocketAddr,
    /// Where to find the model artifacts
    pub model: ModelConfig,
    /// Largest accepted multipart body in bytes
    pub max_upload_bytes: u64,
    /// Serve `/metrics`
    pub enable_metrics: bool,
    /// Service name used in logs
    pub service_name: String,
}

impl Default for BackendConfig {
    /// Creates a default backend configuration with sensible defaults
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 5000)),
            model: ModelConfig::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            enable_metrics: true,
            service_name: "harvest-backend".to_string(),
        }
    }
}

impl BackendConfig {
    /// Creates configuration from environment variables, falling back to defaults
    ///
    /// Reads `HARVEST_LISTEN_ADDR`, `HARVEST_MAX_UPLOAD_BYTES`,
    /// `HARVEST_ENABLE_METRICS`, `HARVEST_SERVICE_NAME` and the model
    /// variables read by [`ModelConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        let mut config = Self {
            model: ModelConfig::from_env()
                .map_err(|e| HarvestError::configuration(e.to_string(), Some(Box::new(e))))?,
            ..Self::default()
        };

        if let Ok(addr) = env::var("HARVEST_LISTEN_ADDR") {
            config.listen_addr = addr.parse()?;
        }

        if let Ok(limit) = env::var("HARVEST_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = limit.parse().map_err(|e| {
                HarvestError::configuration(
                    format!("Invalid HARVEST_MAX_UPLOAD_BYTES '{}'", limit),
                    Some(Box::new(e)),
                )
            })?;
        }

        if let Ok(enabled) = env::var("HARVEST_ENABLE_METRICS") {
            config.enable_metrics = enabled.parse().map_err(|e| {
                HarvestError::configuration(
                    format!("Invalid HARVEST_ENABLE_METRICS '{}'", enabled),
                    Some(Box::new(e)),
                )
            })?;
        }

        if let Ok(name) = env::var("HARVEST_SERVICE_NAME") {
            config.service_name = name;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_upload_bytes == 0 {
            return Err(HarvestError::configuration(
                "max_upload_bytes must be greater than zero",
                None,
            ));
        }

        if self.service_name.trim().is_empty() {
            return Err(HarvestError::configuration(
                "service_name cannot be empty",
                None,
            ));
        }

        self.model
            .validate()
            .map_err(|e| HarvestError::configuration(e.to_string(), Some(Box::new(e))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration_is_valid() {
        let config = BackendConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:5000");
    }

    #[test]
    fn test_zero_upload_limit_rejected() {
        let config = BackendConfig {
            max_upload_bytes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_model_config_rejected() {
        let mut config = BackendConfig::default();
        config.model.artifact_stem = "a/b".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, HarvestError::Configuration { .. }));
    }
}
