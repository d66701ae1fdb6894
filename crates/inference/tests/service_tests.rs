//! Inference Service Tests
//!
//! End-to-end predictions through the service with injected backends.

use harvest_inference::{
    BackendFactory, ClassifierBackend, FormatKind, InferenceError, InferenceResult,
    InferenceService, InputTensor, ModelArtifact, ModelConfigBuilder, ServiceState, CLASS_LABELS,
};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Scores every image as the configured class and records the input shape
struct OneHotBackend {
    kind: FormatKind,
    class_index: usize,
    calls: Arc<AtomicUsize>,
}

impl ClassifierBackend for OneHotBackend {
    fn kind(&self) -> FormatKind {
        self.kind
    }

    fn invoke(&self, input: &InputTensor) -> InferenceResult<Vec<f32>> {
        input.ensure_shape(&self.input_spec())?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut scores = vec![0.01; CLASS_LABELS.len()];
        scores[self.class_index] = 0.9;
        Ok(scores)
    }
}

struct BrokenBackend;

impl ClassifierBackend for BrokenBackend {
    fn kind(&self) -> FormatKind {
        FormatKind::PortableGraph
    }

    fn invoke(&self, _input: &InputTensor) -> InferenceResult<Vec<f32>> {
        Err(InferenceError::inference_failure("output tensor has unexpected rank"))
    }
}

struct OneHotFactory {
    class_index: usize,
    calls: Arc<AtomicUsize>,
}

impl BackendFactory for OneHotFactory {
    fn open(&self, artifact: &ModelArtifact) -> InferenceResult<Box<dyn ClassifierBackend>> {
        Ok(Box::new(OneHotBackend {
            kind: artifact.kind(),
            class_index: self.class_index,
            calls: Arc::clone(&self.calls),
        }))
    }
}

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 90, 20]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

#[test]
fn test_predict_through_started_service() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("vegetable_classification.tflite"), b"x").unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let factory = OneHotFactory {
        class_index: 7,
        calls: Arc::clone(&calls),
    };
    let config = ModelConfigBuilder::new()
        .model_dir(dir.path())
        .build()
        .unwrap();

    let service = InferenceService::start(&config, &factory);
    assert_eq!(service.state(), ServiceState::Ready);
    assert_eq!(service.health().backend_name(), "TFLite");

    let prediction = service.predict(&jpeg(320, 240)).unwrap();
    assert_eq!(prediction.label, "Carrot");
    assert_eq!(prediction.backend_kind, FormatKind::MobileOptimized);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_every_class_index_maps() {
    for (idx, label) in CLASS_LABELS.iter().enumerate() {
        let service = InferenceService::from_backend(Box::new(OneHotBackend {
            kind: FormatKind::PortableGraph,
            class_index: idx,
            calls: Arc::new(AtomicUsize::new(0)),
        }));
        assert_eq!(service.predict(&jpeg(16, 16)).unwrap().label, *label);
    }
}

#[test]
fn test_degraded_never_invokes() {
    let service = InferenceService::degraded();
    let err = service.predict(&jpeg(16, 16)).unwrap_err();
    assert!(matches!(err, InferenceError::ModelUnavailable));
    assert_eq!(
        err.user_message(),
        "⚠️ Model not loaded! Please upload a trained model."
    );
}

#[test]
fn test_bad_image_skips_invocation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let service = InferenceService::from_backend(Box::new(OneHotBackend {
        kind: FormatKind::NativeTraining,
        class_index: 0,
        calls: Arc::clone(&calls),
    }));

    let err = service.predict(b"\x89PNG\r\n\x1a\n").unwrap_err();
    assert!(matches!(err, InferenceError::UnsupportedImage(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_execution_failure_propagates() {
    let service = InferenceService::from_backend(Box::new(BrokenBackend));
    let err = service.predict(&jpeg(16, 16)).unwrap_err();
    assert!(matches!(err, InferenceError::InferenceFailure(_)));
    assert!(err.user_message().contains("Unable to make prediction"));
}

#[test]
fn test_concurrent_predictions() {
    let service = Arc::new(InferenceService::from_backend(Box::new(OneHotBackend {
        kind: FormatKind::PortableGraph,
        class_index: 3,
        calls: Arc::new(AtomicUsize::new(0)),
    })));
    let image = Arc::new(jpeg(32, 32));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            let image = Arc::clone(&image);
            std::thread::spawn(move || service.predict(&image).unwrap().label)
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "Brinjal");
    }
}
