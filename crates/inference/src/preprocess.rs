//! Image preprocessing
//!
//! Turns uploaded image bytes into the `(1, H, W, 3)` float tensor a model
//! representation expects. The geometry and value scaling come from a fixed
//! per-format table ([`InputSpec::for_kind`]); nothing is inferred from the
//! uploaded file itself.

use crate::artifact::FormatKind;
use crate::error::{InferenceError, InferenceResult};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Number of color channels fed to every model
pub const CHANNELS: usize = 3;

/// Filter used for every resize; fixed so results are reproducible
const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Value scaling applied after resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Normalization {
    /// Raw channel values in `[0, 255]`
    Identity,
    /// Channel values divided by 255, giving `[0, 1]`
    UnitRange,
}

impl Normalization {
    #[inline]
    fn apply(self, value: u8) -> f32 {
        match self {
            Self::Identity => f32::from(value),
            Self::UnitRange => f32::from(value) / 255.0,
        }
    }
}

/// Input geometry and scaling required by one model representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Target height in pixels
    pub height: u32,
    /// Target width in pixels
    pub width: u32,
    /// Value scaling
    pub normalization: Normalization,
}

impl InputSpec {
    /// The input contract of each format
    ///
    /// | format | size | scaling |
    /// |---|---|---|
    /// | ONNX | 299x299 | identity |
    /// | TFLite | 150x150 | divide by 255 |
    /// | TorchScript | 299x299 | identity |
    pub const fn for_kind(kind: FormatKind) -> Self {
        match kind {
            FormatKind::PortableGraph | FormatKind::NativeTraining => Self {
                height: 299,
                width: 299,
                normalization: Normalization::Identity,
            },
            FormatKind::MobileOptimized => Self {
                height: 150,
                width: 150,
                normalization: Normalization::UnitRange,
            },
        }
    }

    /// Tensor shape for a single image, NHWC
    pub const fn shape(&self) -> [usize; 4] {
        [1, self.height as usize, self.width as usize, CHANNELS]
    }

    /// Number of elements in a tensor of this shape
    pub const fn element_count(&self) -> usize {
        self.height as usize * self.width as usize * CHANNELS
    }
}

/// Dense `f32` tensor in NHWC layout, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    shape: [usize; 4],
    data: Vec<f32>,
}

impl InputTensor {
    /// Wraps raw data, checking that its length matches the shape
    pub fn new(shape: [usize; 4], data: Vec<f32>) -> InferenceResult<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(InferenceError::ShapeMismatch {
                expected: shape,
                actual: vec![data.len()],
            });
        }
        Ok(Self { shape, data })
    }

    /// Tensor shape `(1, H, W, 3)`
    pub const fn shape(&self) -> [usize; 4] {
        self.shape
    }

    /// Tensor values
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Fails with `ShapeMismatch` unless the tensor fits `spec`
    pub fn ensure_shape(&self, spec: &InputSpec) -> InferenceResult<()> {
        let expected = spec.shape();
        if self.shape != expected {
            return Err(InferenceError::ShapeMismatch {
                expected,
                actual: self.shape.to_vec(),
            });
        }
        Ok(())
    }
}

/// Decodes `bytes` and converts them into a tensor matching `spec`
///
/// The container format is guessed from the content. Any decode failure, or
/// an image with zero width or height, is reported as `UnsupportedImage`.
pub fn preprocess(bytes: &[u8], spec: &InputSpec) -> InferenceResult<InputTensor> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| InferenceError::UnsupportedImage(e.to_string()))?;

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(InferenceError::UnsupportedImage(
            "image has zero width or height".to_string(),
        ));
    }

    debug!(
        width = decoded.width(),
        height = decoded.height(),
        target_width = spec.width,
        target_height = spec.height,
        "Preprocessing image"
    );

    let rgb = decoded.to_rgb8();
    let resized = image::imageops::resize(&rgb, spec.width, spec.height, RESIZE_FILTER);

    let data: Vec<f32> = resized
        .into_raw()
        .into_iter()
        .map(|v| spec.normalization.apply(v))
        .collect();

    InputTensor::new(spec.shape(), data)
}
