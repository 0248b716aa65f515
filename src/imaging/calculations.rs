//! Pure calculation functions for variant dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! [`plan_variant`](super::operations::plan_variant) runs them for every
//! width before any pixels are touched, so a bad crop is reported before
//! the first encode.

use super::backend::{BackendError, Dimensions};
use super::params::{CropRegion, Rotation};
use thiserror::Error;

/// Largest raster a variant may allocate, in bytes.
///
/// Same ceiling as `image::Limits::default().max_alloc`, which the decoder
/// already applies to uploads.
pub const MAX_VARIANT_BYTES: u64 = 512 * 1024 * 1024;

/// RGBA8 is the baseline used for the size check.
const BYTES_PER_PIXEL: u64 = 4;

/// A crop box that does not fit inside the resized image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CropError {
    #[error(
        "crop exceeds image width: left {left} + width {width} > {image_width}px"
    )]
    ExceedsWidth {
        left: u32,
        width: u32,
        image_width: u32,
    },
    #[error(
        "crop exceeds image height: top {top} + height {height} > {image_height}px"
    )]
    ExceedsHeight {
        top: u32,
        height: u32,
        image_height: u32,
    },
}

/// Calculate the resized dimensions for a target width, preserving aspect ratio.
///
/// `height = floor(source.height * target_width / source.width)`, computed in
/// integer arithmetic so results are exact for every input.
///
/// # Errors
/// * `InvalidSource` if the source width or the target width is zero, if the
///   result would be zero pixels tall (a very wide source at a small width),
///   or if the resized raster would exceed [`MAX_VARIANT_BYTES`] (a very tall,
///   narrow source upscaled to a large width).
///
/// # Examples
/// ```
/// # use png_trio::imaging::{Dimensions, variant_dimensions};
/// let source = Dimensions { width: 1000, height: 500 };
/// let resized = variant_dimensions(source, 200).unwrap();
/// assert_eq!(resized, Dimensions { width: 200, height: 100 });
/// ```
pub fn variant_dimensions(
    source: Dimensions,
    target_width: u32,
) -> Result<Dimensions, BackendError> {
    if source.width == 0 {
        return Err(BackendError::InvalidSource("source width is 0".into()));
    }
    if target_width == 0 {
        return Err(BackendError::InvalidSource("target width is 0".into()));
    }

    let height = u64::from(source.height) * u64::from(target_width) / u64::from(source.width);
    let bytes = height
        .saturating_mul(u64::from(target_width))
        .saturating_mul(BYTES_PER_PIXEL);
    if bytes > MAX_VARIANT_BYTES {
        return Err(BackendError::InvalidSource(format!(
            "{}x{} resized to width {} is {}x{}px, over the {} MiB raster limit",
            source.width,
            source.height,
            target_width,
            target_width,
            height,
            MAX_VARIANT_BYTES / (1024 * 1024)
        )));
    }
    let height = u32::try_from(height).map_err(|_| {
        BackendError::InvalidSource(format!(
            "{}x{} resized to width {} is too tall",
            source.width, source.height, target_width
        ))
    })?;
    if height == 0 {
        return Err(BackendError::InvalidSource(format!(
            "{}x{} resized to width {} would be 0px tall",
            source.width, source.height, target_width
        )));
    }

    Ok(Dimensions {
        width: target_width,
        height,
    })
}

/// Check that a crop box lies entirely inside an image.
///
/// Width is checked before height, so a box that overflows both is reported
/// against the width.
pub fn check_crop(image: Dimensions, crop: &CropRegion) -> Result<(), CropError> {
    if crop.right() > u64::from(image.width) {
        return Err(CropError::ExceedsWidth {
            left: crop.left,
            width: crop.width,
            image_width: image.width,
        });
    }
    if crop.bottom() > u64::from(image.height) {
        return Err(CropError::ExceedsHeight {
            top: crop.top,
            height: crop.height,
            image_height: image.height,
        });
    }
    Ok(())
}

/// Dimensions after cropping. The crop must already have passed [`check_crop`].
pub fn cropped_dimensions(crop: &CropRegion) -> Dimensions {
    Dimensions {
        width: crop.width,
        height: crop.height,
    }
}

/// Dimensions after the rotate/flip step.
pub fn oriented_dimensions(dims: Dimensions, rotation: Rotation) -> Dimensions {
    if rotation.swaps_axes() {
        Dimensions {
            width: dims.height,
            height: dims.width,
        }
    } else {
        dims
    }
}
