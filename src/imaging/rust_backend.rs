//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP, BMP, TIFF) | `image::ImageReader` with content sniffing |
//! | Resize | `DynamicImage::resize_exact` with [`RESAMPLE_FILTER`] |
//! | Sharpen | [`enhance_sharpness`](super::sharpness::enhance_sharpness) |
//! | Crop | `DynamicImage::crop_imm` |
//! | Rotate / flip | `DynamicImage::{rotate90, rotate180, rotate270, fliph, flipv}` |
//! | Encode → PNG | `image::codecs::png::PngEncoder`, default compression |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::check_crop;
use super::params::{CropRegion, Rotation};
use super::sharpness::enhance_sharpness;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::sync::LazyLock;
use tracing::debug;

/// Resampling filter for the resize step.
///
/// Fixed so that every build produces the same pixels for the same input.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Upload formats, keyed by the extensions a file picker should offer.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the upload extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

fn is_supported_format(format: ImageFormat) -> bool {
    INPUT_CANDIDATES
        .iter()
        .any(|(_, candidate)| *candidate == format && format.reading_enabled())
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// PNG has no float sample type; bring float rasters down to 16 bits.
fn normalize_color(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(img.to_rgb16()),
        DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba16(img.to_rgba16()),
        other => other,
    }
}

impl ImageBackend for RustBackend {
    type Raster = DynamicImage;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BackendError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| BackendError::Decode(format!("Failed to read upload: {e}")))?;

        let format = reader
            .format()
            .ok_or_else(|| BackendError::UnsupportedFormat("unrecognized file contents".into()))?;
        if !is_supported_format(format) {
            return Err(BackendError::UnsupportedFormat(format!("{format:?}")));
        }

        let img = reader
            .decode()
            .map_err(|e| BackendError::Decode(format!("{format:?}: {e}")))?;
        debug!(?format, width = img.width(), height = img.height(), "decoded upload");

        if img.width() == 0 || img.height() == 0 {
            return Err(BackendError::InvalidSource(format!(
                "{}x{} image has no pixels",
                img.width(),
                img.height()
            )));
        }
        Ok(normalize_color(img))
    }

    fn dimensions(&self, raster: &DynamicImage) -> Dimensions {
        Dimensions {
            width: raster.width(),
            height: raster.height(),
        }
    }

    fn resize(
        &self,
        raster: &DynamicImage,
        size: Dimensions,
    ) -> Result<DynamicImage, BackendError> {
        Ok(raster.resize_exact(size.width, size.height, RESAMPLE_FILTER))
    }

    fn sharpen(&self, raster: DynamicImage, factor: f32) -> Result<DynamicImage, BackendError> {
        Ok(enhance_sharpness(raster, factor))
    }

    fn crop(&self, raster: DynamicImage, crop: &CropRegion) -> Result<DynamicImage, BackendError> {
        check_crop(self.dimensions(&raster), crop)?;
        Ok(raster.crop_imm(crop.left, crop.top, crop.width, crop.height))
    }

    fn orient(&self, raster: DynamicImage, rotation: Rotation) -> DynamicImage {
        match rotation {
            Rotation::None => raster,
            Rotation::Rotate90 => raster.rotate90(),
            Rotation::Rotate180 => raster.rotate180(),
            Rotation::Rotate270 => raster.rotate270(),
            Rotation::FlipHorizontal => raster.fliph(),
            Rotation::FlipVertical => raster.flipv(),
        }
    }

    fn encode_png(&self, raster: &DynamicImage) -> Result<Vec<u8>, BackendError> {
        let mut bytes = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut bytes, CompressionType::Default, PngFilter::Adaptive);
        raster
            .write_with_encoder(encoder)
            .map_err(|e| BackendError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}
