//! The classification service
//!
//! Composes artifact discovery, backend loading, preprocessing, invocation
//! and label mapping. Loading happens once in [`InferenceService::start`];
//! the resulting state never changes for the life of the process.

use crate::artifact::FormatKind;
use crate::backend::{BackendHandle, ClassifierBackend};
use crate::config::ModelConfig;
use crate::error::{InferenceError, InferenceResult};
use crate::labels::LabelMapper;
use crate::loader::{BackendFactory, BackendLoader, LoadOutcome, LoadReport};
use crate::preprocess::preprocess;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Lifecycle state after startup
///
/// Artifact discovery and loading run inside [`InferenceService::start`], so
/// a constructed service is always in one of these two terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    /// A backend is loaded and predictions are served
    Ready,
    /// No backend could be loaded; predictions fail with `ModelUnavailable`
    Degraded,
}

/// A successful prediction with diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// Class name, or `"Unknown"`
    pub label: String,
    /// Winning index in the score vector
    pub class_index: Option<usize>,
    /// Score at the winning index
    pub score: Option<f32>,
    /// Representation that produced the scores
    pub backend_kind: FormatKind,
    /// Time spent in preprocessing, invocation and mapping
    pub elapsed: Duration,
    /// True when the winning index had no label
    pub out_of_range: bool,
}

/// Readiness summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Whether a backend is loaded
    pub ready: bool,
    /// Representation of the loaded backend
    pub backend_kind: Option<FormatKind>,
}

impl HealthReport {
    /// Backend name as reported to clients, `"None"` when degraded
    pub fn backend_name(&self) -> &'static str {
        self.backend_kind.map_or("None", FormatKind::display_name)
    }
}

/// Image classification over the backend selected at startup
#[derive(Debug)]
pub struct InferenceService {
    handle: Option<BackendHandle>,
    labels: LabelMapper,
    report: LoadReport,
}

impl InferenceService {
    /// Locates and loads a backend, ending `Ready` or `Degraded`
    ///
    /// Never fails: a missing directory or unloadable artifacts produce a
    /// degraded service that still answers health checks.
    pub fn start(config: &ModelConfig, factory: &dyn BackendFactory) -> Self {
        let model_dir = config.resolved_model_dir();
        info!(
            model_dir = %model_dir.display(),
            stem = %config.artifact_stem,
            "Locating model artifacts"
        );

        let artifacts = config.locator().locate(&model_dir);
        if artifacts.is_empty() {
            warn!(model_dir = %model_dir.display(), "No model artifacts found");
        }

        let LoadOutcome { handle, report } = BackendLoader::new(factory).load(&artifacts);
        let service = Self {
            handle,
            labels: LabelMapper::default(),
            report,
        };

        match service.handle.as_ref() {
            Some(handle) => info!(kind = %handle.kind(), "Inference service ready"),
            None => warn!("Inference service running in degraded mode"),
        }

        service
    }

    /// Ready service around an already-constructed backend
    pub fn from_backend(backend: Box<dyn ClassifierBackend>) -> Self {
        let report = LoadReport::injected(backend.kind());
        Self {
            handle: Some(BackendHandle::new(backend)),
            labels: LabelMapper::default(),
            report,
        }
    }

    /// Service with no backend
    pub fn degraded() -> Self {
        Self {
            handle: None,
            labels: LabelMapper::default(),
            report: LoadReport::empty(),
        }
    }

    /// Replaces the label table
    #[must_use]
    pub fn with_labels(mut self, labels: LabelMapper) -> Self {
        self.labels = labels;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServiceState {
        if self.handle.is_some() {
            ServiceState::Ready
        } else {
            ServiceState::Degraded
        }
    }

    /// Readiness and backend kind
    pub fn health(&self) -> HealthReport {
        HealthReport {
            ready: self.handle.is_some(),
            backend_kind: self.handle.as_ref().map(BackendHandle::kind),
        }
    }

    /// Per-format outcome of startup loading
    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    /// The loaded backend, if any
    pub fn handle(&self) -> Option<&BackendHandle> {
        self.handle.as_ref()
    }

    /// Classifies one uploaded image
    ///
    /// Degraded services fail immediately without decoding. Otherwise the
    /// image is preprocessed for the active backend's input contract,
    /// scored, and mapped to a label; the first failing step is returned.
    pub fn predict(&self, image_bytes: &[u8]) -> InferenceResult<Prediction> {
        let handle = self.handle.as_ref().ok_or(InferenceError::ModelUnavailable)?;
        let backend = handle.backend();
        let started = Instant::now();

        let tensor = preprocess(image_bytes, &backend.input_spec()).map_err(|e| {
            warn!(error = %e, bytes = image_bytes.len(), "Rejected uploaded image");
            e
        })?;

        let scores = backend.invoke(&tensor).map_err(|e| {
            error!(kind = %handle.kind(), error = %e, "Inference failed");
            e
        })?;

        let classification = self.labels.classify(&scores);
        let elapsed = started.elapsed();

        debug!(
            label = %classification.label,
            class_index = ?classification.class_index,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "Prediction complete"
        );

        Ok(Prediction {
            label: classification.label,
            class_index: classification.class_index,
            score: classification.score,
            backend_kind: handle.kind(),
            elapsed,
            out_of_range: classification.out_of_range,
        })
    }
}
