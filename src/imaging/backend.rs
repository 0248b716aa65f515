//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the pixel operations the variant
//! pipeline is built from: decode, resize, sharpen, crop, orient, and PNG
//! encode. The ordering of those operations lives in
//! [`operations`](super::operations), not here, so it can be tested against
//! a recording mock without decoding a single pixel.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate.

use super::calculations::CropError;
use super::params::{CropRegion, Rotation};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid source image: {0}")]
    InvalidSource(String),
    #[error("Invalid crop: {0}")]
    InvalidCrop(#[from] CropError),
    #[error("Failed to encode PNG: {0}")]
    Encode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Pixel dimensions of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// `Raster` is the backend's decoded image type. The source raster is shared
/// by reference across concurrently running variants, so it must be `Sync`.
/// Steps that transform in place take the raster by value.
pub trait ImageBackend: Sync {
    type Raster: Send + Sync;

    /// Decode uploaded file bytes, sniffing the format from content.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Raster, BackendError>;

    fn dimensions(&self, raster: &Self::Raster) -> Dimensions;

    /// Resample to exactly `size` with the backend's high-quality filter.
    fn resize(&self, raster: &Self::Raster, size: Dimensions) -> Result<Self::Raster, BackendError>;

    /// Sharpness enhancement. A factor of 1.0 must be the identity.
    fn sharpen(&self, raster: Self::Raster, factor: f32) -> Result<Self::Raster, BackendError>;

    /// Cut out `crop`. Callers check bounds first; backends re-check anyway.
    fn crop(&self, raster: Self::Raster, crop: &CropRegion) -> Result<Self::Raster, BackendError>;

    /// Apply a rotate/flip. Pixel-exact; cannot fail.
    fn orient(&self, raster: Self::Raster, rotation: Rotation) -> Self::Raster;

    /// Lossless PNG with default compression.
    fn encode_png(&self, raster: &Self::Raster) -> Result<Vec<u8>, BackendError>;
}
