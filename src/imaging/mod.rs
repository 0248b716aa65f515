//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, WebP, BMP, TIFF) |
//! | **Resize** | Lanczos3 ([`RESAMPLE_FILTER`]) |
//! | **Sharpen** | smoothed-copy blend ([`sharpness`]) |
//! | **Crop / rotate / flip** | `image::DynamicImage` geometry ops |
//! | **Encode** | PNG, default compression |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing one request's transforms
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: The fixed variant sequence combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;
pub mod sharpness;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{
    CropError, MAX_VARIANT_BYTES, check_crop, oriented_dimensions, variant_dimensions,
};
pub use operations::{
    VariantError, VariantOutput, VariantPlan, plan_variant, produce_variant, produce_variants,
    variant_file_name,
};
pub use params::{
    CropRegion, ParamError, Rotation, SharpenStrength, TransformParams, VARIANT_WIDTHS,
};
pub use rust_backend::{RESAMPLE_FILTER, RustBackend, supported_input_extensions};
