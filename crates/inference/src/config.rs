//! Model configuration for the Harvest inference runtime

use crate::artifact::{ArtifactLocator, DEFAULT_ARTIFACT_STEM};
use crate::error::{ConfigError, InferenceResult};
use harvest_shared::{default_models_dir, resolve_models_path};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

/// Where the service looks for its model artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ModelConfig {
    /// Directory holding the artifacts (`~` is expanded)
    #[validate(length(min = 1, message = "Model directory cannot be empty"))]
    pub model_dir: String,

    /// File stem shared by the artifact files
    #[validate(
        length(min = 1, message = "Artifact stem cannot be empty"),
        custom(function = "validate_artifact_stem")
    )]
    pub artifact_stem: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: default_models_dir().to_string_lossy().into_owned(),
            artifact_stem: DEFAULT_ARTIFACT_STEM.to_string(),
        }
    }
}

impl ModelConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `HARVEST_MODEL_DIR` and `HARVEST_MODEL_STEM`; unset variables
    /// keep their defaults.
    pub fn from_env() -> InferenceResult<Self> {
        let mut config = Self::default();

        if let Ok(model_dir) = env::var("HARVEST_MODEL_DIR") {
            config.model_dir = model_dir;
        }

        if let Ok(stem) = env::var("HARVEST_MODEL_STEM") {
            config.artifact_stem = stem;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> InferenceResult<()> {
        Validate::validate(self).map_err(ConfigError::from)?;
        Ok(())
    }

    /// The model directory with `~` expanded
    #[must_use]
    pub fn resolved_model_dir(&self) -> PathBuf {
        resolve_models_path(&self.model_dir)
    }

    /// Locator for this configuration's artifact names
    #[must_use]
    pub fn locator(&self) -> ArtifactLocator {
        ArtifactLocator::new(self.artifact_stem.clone())
    }
}

/// Configuration builder for fluent configuration construction
#[derive(Debug, Default)]
pub struct ModelConfigBuilder {
    config: ModelConfig,
}

impl ModelConfigBuilder {
    /// Create a new configuration builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model directory
    #[must_use]
    pub fn model_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.model_dir = path.as_ref().to_string_lossy().into_owned();
        self
    }

    /// Set the artifact file stem
    #[must_use]
    pub fn artifact_stem<S: Into<String>>(mut self, stem: S) -> Self {
        self.config.artifact_stem = stem.into();
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> InferenceResult<ModelConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn validate_artifact_stem(stem: &str) -> Result<(), ValidationError> {
    if stem.contains(['/', '\\']) || stem == "." || stem == ".." {
        let mut err = ValidationError::new("invalid_stem");
        err.message = Some("Artifact stem must be a plain file name".into());
        return Err(err);
    }
    Ok(())
}
