//! High-level variant operations.
//!
//! These functions combine calculations with backend execution. Every
//! variant goes through the same fixed sequence:
//!
//! ```text
//! resize → sharpen → crop → rotate/flip → encode PNG
//! ```
//!
//! [`plan_variant`] works out every intermediate size without touching
//! pixels; [`produce_variant`] executes a plan against a backend.
//! [`produce_variants`] plans all three widths first, so an impossible crop
//! fails the request before any encoding starts.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::{check_crop, cropped_dimensions, oriented_dimensions, variant_dimensions};
use super::params::{CropRegion, Rotation, TransformParams, VARIANT_WIDTHS};
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// A failure while producing one specific width.
#[derive(Error, Debug)]
#[error("{width}px variant: {source}")]
pub struct VariantError {
    pub width: u32,
    #[source]
    pub source: BackendError,
}

/// Archive entry name for a variant width.
pub fn variant_file_name(width: u32) -> String {
    format!("{width}px.png")
}

/// Every size and step for one variant, worked out up front.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantPlan {
    pub target_width: u32,
    /// Size after the resize step.
    pub resized: Dimensions,
    /// `Some(factor)` when the sharpen step runs.
    pub sharpen_factor: Option<f32>,
    pub crop: Option<CropRegion>,
    pub rotation: Rotation,
    /// Size of the encoded PNG.
    pub output: Dimensions,
}

/// One encoded variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantOutput {
    pub target_width: u32,
    pub file_name: String,
    pub dimensions: Dimensions,
    pub png: Vec<u8>,
}

/// Plan a variant without executing it.
///
/// Fails with `InvalidSource` for unusable source sizes and `InvalidCrop` when
/// the crop box does not fit inside the resized image.
pub fn plan_variant(
    source: Dimensions,
    target_width: u32,
    params: &TransformParams,
) -> Result<VariantPlan> {
    let resized = variant_dimensions(source, target_width)?;

    let cropped = match &params.crop {
        Some(crop) => {
            check_crop(resized, crop)?;
            cropped_dimensions(crop)
        }
        None => resized,
    };

    Ok(VariantPlan {
        target_width,
        resized,
        sharpen_factor: params.sharpen.is_active().then(|| params.sharpen.factor()),
        crop: params.crop,
        rotation: params.rotation,
        output: oriented_dimensions(cropped, params.rotation),
    })
}

/// Run an already validated plan.
pub fn execute_plan<B: ImageBackend>(
    backend: &B,
    source: &B::Raster,
    plan: &VariantPlan,
) -> Result<VariantOutput> {
    debug!(width = plan.target_width, size = %plan.resized, "resize");
    let mut raster = backend.resize(source, plan.resized)?;

    if let Some(factor) = plan.sharpen_factor {
        debug!(width = plan.target_width, factor, "sharpen");
        raster = backend.sharpen(raster, factor)?;
    }

    if let Some(crop) = &plan.crop {
        debug!(width = plan.target_width, ?crop, "crop");
        raster = backend.crop(raster, crop)?;
    }

    if plan.rotation != Rotation::None {
        debug!(width = plan.target_width, rotation = %plan.rotation, "orient");
    }
    let raster = backend.orient(raster, plan.rotation);

    let dimensions = backend.dimensions(&raster);
    if dimensions != plan.output {
        return Err(BackendError::ProcessingFailed(format!(
            "expected {} output, backend produced {}",
            plan.output, dimensions
        )));
    }

    let png = backend.encode_png(&raster)?;
    debug!(width = plan.target_width, bytes = png.len(), "encoded");

    Ok(VariantOutput {
        target_width: plan.target_width,
        file_name: variant_file_name(plan.target_width),
        dimensions,
        png,
    })
}

/// Produce a single variant: plan, then execute.
pub fn produce_variant<B: ImageBackend>(
    backend: &B,
    source: &B::Raster,
    target_width: u32,
    params: &TransformParams,
) -> Result<VariantOutput> {
    let plan = plan_variant(backend.dimensions(source), target_width, params)?;
    execute_plan(backend, source, &plan)
}

/// Produce all three fixed-width variants, in width order.
///
/// Every plan is validated before any pixel work. With `parallel` the
/// variants run on the rayon pool; output order is the same either way.
pub fn produce_variants<B: ImageBackend>(
    backend: &B,
    source: &B::Raster,
    params: &TransformParams,
    parallel: bool,
) -> std::result::Result<Vec<VariantOutput>, VariantError> {
    let source_dims = backend.dimensions(source);
    let plans = VARIANT_WIDTHS
        .iter()
        .map(|&width| {
            plan_variant(source_dims, width, params)
                .map_err(|source| VariantError { width, source })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let run = |plan: &VariantPlan| {
        execute_plan(backend, source, plan).map_err(|source| VariantError {
            width: plan.target_width,
            source,
        })
    };

    if parallel {
        plans.par_iter().map(run).collect()
    } else {
        plans.iter().map(run).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::calculations::CropError;
    use crate::imaging::params::SharpenStrength;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    fn params(sharpen: f32, crop: Option<CropRegion>, rotation: Rotation) -> TransformParams {
        TransformParams {
            sharpen: SharpenStrength::new(sharpen).unwrap(),
            crop,
            rotation,
        }
    }

    #[test]
    fn file_names_follow_width() {
        assert_eq!(variant_file_name(20), "20px.png");
        assert_eq!(variant_file_name(2048), "2048px.png");
    }

    #[test]
    fn plan_identity_params() {
        let plan = plan_variant(dims(1000, 500), 200, &TransformParams::default()).unwrap();
        assert_eq!(plan.resized, dims(200, 100));
        assert_eq!(plan.sharpen_factor, None);
        assert_eq!(plan.crop, None);
        assert_eq!(plan.output, dims(200, 100));
    }

    #[test]
    fn plan_crop_then_rotate() {
        let crop = CropRegion::from_fields(10, 10, 60, 30);
        let plan =
            plan_variant(dims(1000, 500), 200, &params(1.5, crop, Rotation::Rotate90)).unwrap();
        assert_eq!(plan.resized, dims(200, 100));
        assert_eq!(plan.sharpen_factor, Some(2.5));
        // 60x30 crop, then a quarter turn
        assert_eq!(plan.output, dims(30, 60));
    }

    #[test]
    fn plan_crop_too_big_for_smallest_width() {
        let crop = CropRegion::from_fields(0, 0, 50, 50);
        let err =
            plan_variant(dims(1000, 500), 20, &params(0.0, crop, Rotation::None)).unwrap_err();
        assert!(matches!(
            err,
            BackendError::InvalidCrop(CropError::ExceedsWidth { image_width: 20, .. })
        ));
    }

    #[test]
    fn produce_runs_steps_in_fixed_order() {
        let backend = MockBackend::new();
        let crop = CropRegion::from_fields(1, 2, 100, 50);
        let source = dims(1000, 500);

        let output = produce_variant(
            &backend,
            &source,
            200,
            &params(1.0, crop, Rotation::FlipVertical),
        )
        .unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Resize {
                    width: 200,
                    height: 100
                },
                RecordedOp::Sharpen { factor: 2.0 },
                RecordedOp::Crop(crop.unwrap()),
                RecordedOp::Orient(Rotation::FlipVertical),
                RecordedOp::Encode {
                    width: 100,
                    height: 50
                },
            ]
        );
        assert_eq!(output.file_name, "200px.png");
        assert_eq!(output.dimensions, dims(100, 50));
        assert_eq!(output.png, b"png:100x50");
    }

    #[test]
    fn produce_skips_sharpen_at_zero_strength() {
        let backend = MockBackend::new();
        produce_variant(&backend, &dims(1000, 500), 20, &TransformParams::default()).unwrap();

        let ops = backend.get_operations();
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::Sharpen { .. })));
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::Crop(_))));
    }

    #[test]
    fn produce_variants_in_width_order() {
        let backend = MockBackend::new();
        let params = TransformParams::default();
        let outputs = produce_variants(&backend, &dims(1000, 500), &params, true).unwrap();

        let names: Vec<_> = outputs.iter().map(|o| o.file_name.as_str()).collect();
        assert_eq!(names, vec!["20px.png", "200px.png", "2048px.png"]);
        let sizes: Vec<_> = outputs.iter().map(|o| o.dimensions).collect();
        assert_eq!(sizes, vec![dims(20, 10), dims(200, 100), dims(2048, 1024)]);
    }

    #[test]
    fn produce_variants_validates_before_any_work() {
        let backend = MockBackend::new();
        let crop = CropRegion::from_fields(0, 0, 50, 50);

        let err = produce_variants(
            &backend,
            &dims(1000, 500),
            &params(0.0, crop, Rotation::None),
            false,
        )
        .unwrap_err();

        assert_eq!(err.width, 20);
        assert!(err.to_string().starts_with("20px variant:"), "{err}");
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn produce_variants_reports_failing_width() {
        let backend = MockBackend::new().failing_encode_at(2048);
        let err = produce_variants(&backend, &dims(1000, 500), &TransformParams::default(), false)
            .unwrap_err();

        assert_eq!(err.width, 2048);
        assert!(matches!(err.source, BackendError::Encode(_)));
    }
}
