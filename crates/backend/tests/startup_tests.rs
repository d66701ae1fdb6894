//! Startup Tests
//!
//! The server must come up and answer health checks whatever state the
//! model directory is in.

use harvest_backend::{BackendConfig, ClassifierServer, HealthResponse};
use harvest_inference::{InferenceService, ModelConfigBuilder, RuntimeBackendFactory};
use harvest_shared::test_utils::get_random_port_addr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

async fn health_of(model_dir: &std::path::Path) -> HealthResponse {
    let model = ModelConfigBuilder::new().model_dir(model_dir).build().unwrap();
    let service = InferenceService::start(&model, &RuntimeBackendFactory);

    let config = BackendConfig {
        listen_addr: get_random_port_addr(),
        model,
        ..Default::default()
    };
    let addr = config.listen_addr;
    let (tx, rx) = oneshot::channel::<()>();
    let task = tokio::spawn(
        ClassifierServer::new(Arc::new(service), &config).serve_with_shutdown(async {
            rx.await.ok();
        }),
    );

    let mut health = None;
    for _ in 0..100 {
        if let Ok(response) = reqwest::get(format!("http://{}/health", addr)).await {
            health = Some(response.json::<HealthResponse>().await.unwrap());
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let _ = tx.send(());
    task.await.unwrap().unwrap();
    health.expect("server never answered /health")
}

#[tokio::test]
async fn test_missing_model_directory_starts_degraded() {
    let health = health_of(std::path::Path::new("/nonexistent/harvest")).await;
    assert_eq!(health.status, "healthy");
    assert!(!health.model_loaded);
    assert_eq!(health.model_type, "None");
}

#[tokio::test]
async fn test_corrupt_artifacts_start_degraded() {
    let dir = tempfile::tempdir().unwrap();
    for ext in ["onnx", "tflite", "pt"] {
        std::fs::write(
            dir.path().join(format!("vegetable_classification.{}", ext)),
            b"corrupt",
        )
        .unwrap();
    }

    let health = health_of(dir.path()).await;
    assert!(!health.model_loaded);
}
