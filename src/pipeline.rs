//! One request, end to end.
//!
//! ```text
//! upload bytes ─ decode ─┬─ 20px   variant ─┐
//!                        ├─ 200px  variant ─┼─ pack → archive bytes
//!                        └─ 2048px variant ─┘
//! ```
//!
//! A request either yields all three variants plus the archive, or an error.
//! There is no partial result: every variant is planned (and its crop checked)
//! before any pixel work, and the archive is only packed once all three
//! encodes have succeeded.

use crate::archive::{self, ARCHIVE_FILE_NAME, ARCHIVE_MIME_TYPE, ArchiveError};
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, ParamError, RustBackend, TransformParams, VariantError,
    VariantOutput, produce_variants,
};
use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::info;

/// What went wrong, in terms a user-facing collaborator can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The upload is not a readable image of a supported type.
    Decode,
    /// The crop box does not fit inside a resized variant.
    InvalidCrop,
    /// PNG or archive serialization failed.
    Encode,
    /// A parameter was out of range or unrecognized.
    InvalidParams,
    /// The image decoded but cannot be resized (e.g. would be 0px tall).
    InvalidSource,
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Could not read image: {0}")]
    Decode(#[source] BackendError),
    #[error(transparent)]
    Variant(#[from] VariantError),
    #[error("Failed to pack archive: {0}")]
    Archive(#[from] ArchiveError),
    #[error("Invalid parameters: {0}")]
    Params(#[from] ParamError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Decode(BackendError::InvalidSource(_)) => ErrorKind::InvalidSource,
            PipelineError::Decode(_) => ErrorKind::Decode,
            PipelineError::Variant(err) => match err.source {
                BackendError::InvalidCrop(_) => ErrorKind::InvalidCrop,
                BackendError::InvalidSource(_) => ErrorKind::InvalidSource,
                BackendError::Decode(_)
                | BackendError::UnsupportedFormat(_)
                | BackendError::Encode(_)
                | BackendError::ProcessingFailed(_) => ErrorKind::Encode,
            },
            PipelineError::Archive(_) => ErrorKind::Encode,
            PipelineError::Params(_) => ErrorKind::InvalidParams,
        }
    }
}

/// The result of one request: three variants and the archive holding them.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Size of the decoded upload.
    pub source: Dimensions,
    /// The transform every variant went through.
    pub params: TransformParams,
    /// In width order: 20, 200, 2048.
    pub variants: Vec<VariantOutput>,
    pub archive: Vec<u8>,
}

impl Bundle {
    pub fn archive_file_name(&self) -> &'static str {
        ARCHIVE_FILE_NAME
    }

    pub fn archive_mime_type(&self) -> &'static str {
        ARCHIVE_MIME_TYPE
    }

    /// Decode each variant back to a raster for on-screen preview.
    pub fn previews(&self) -> Result<Vec<(&str, DynamicImage)>, PipelineError> {
        self.variants
            .iter()
            .map(|variant| {
                image::load_from_memory_with_format(&variant.png, ImageFormat::Png)
                    .map(|img| (variant.file_name.as_str(), img))
                    .map_err(|e| {
                        PipelineError::Decode(BackendError::Decode(format!(
                            "{}: {e}",
                            variant.file_name
                        )))
                    })
            })
            .collect()
    }
}

/// Runs requests against an image backend.
pub struct Pipeline<B = RustBackend> {
    backend: B,
    parallel: bool,
}

impl Pipeline<RustBackend> {
    pub fn new() -> Self {
        Self::with_backend(RustBackend::new())
    }
}

impl Default for Pipeline<RustBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ImageBackend> Pipeline<B> {
    /// Parallel by default.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            parallel: true,
        }
    }

    /// Run the three variants on the rayon pool (`true`) or one after another.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run a request from raw user input: a sharpen strength, the four crop
    /// fields (`[left, top, width, height]`) and a rotation name or label.
    ///
    /// Parameters are validated before the upload is decoded.
    pub fn run_inputs(
        &self,
        upload: &[u8],
        sharpen: f32,
        crop: [u32; 4],
        rotation: &str,
    ) -> Result<Bundle, PipelineError> {
        let params = TransformParams::from_inputs(sharpen, crop, rotation)?;
        self.run(upload, &params)
    }

    pub fn run(&self, upload: &[u8], params: &TransformParams) -> Result<Bundle, PipelineError> {
        let source = self.backend.decode(upload).map_err(PipelineError::Decode)?;
        let source_dims = self.backend.dimensions(&source);
        info!(
            source = %source_dims,
            sharpen = params.sharpen.value(),
            crop = ?params.crop,
            rotation = %params.rotation,
            parallel = self.parallel,
            "generating variants"
        );

        let variants = produce_variants(&self.backend, &source, params, self.parallel)?;
        let archive = archive::pack(&variants)?;
        info!(archive_bytes = archive.len(), "packed archive");

        Ok(Bundle {
            source: source_dims,
            params: *params,
            variants,
            archive,
        })
    }
}

/// Run one request with the default backend.
pub fn generate(upload: &[u8], params: &TransformParams) -> Result<Bundle, PipelineError> {
    Pipeline::new().run(upload, params)
}
