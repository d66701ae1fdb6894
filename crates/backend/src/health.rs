//! Health payload served on `GET /health`

use harvest_inference::HealthReport;
use serde::{Deserialize, Serialize};

/// JSON body of the health endpoint
///
/// `status` is always `"healthy"` while the process answers; readiness is
/// carried by `model_loaded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Liveness, always `"healthy"`
    pub status: String,
    /// Whether a model backend is loaded
    pub model_loaded: bool,
    /// `"ONNX"`, `"TFLite"`, `"TorchScript"` or `"None"`
    pub model_type: String,
}

impl From<HealthReport> for HealthResponse {
    fn from(report: HealthReport) -> Self {
        Self {
            status: "healthy".to_string(),
            model_loaded: report.ready,
            model_type: report.backend_name().to_string(),
        }
    }
}
