//! # png-trio
//!
//! Resize one image into three PNG variants (20, 200 and 2048 px wide), each
//! optionally sharpened, cropped and rotated/flipped, and bundle them as a
//! ZIP archive.
//!
//! # Architecture: One Fixed Pipeline
//!
//! Every variant goes through the same five steps, in this order:
//!
//! ```text
//! resize → sharpen → crop → rotate/flip → encode PNG
//! ```
//!
//! The three widths run independently over the same decoded source and the
//! same [`TransformParams`](imaging::TransformParams), then the archive
//! packer bundles their outputs as `20px.png`, `200px.png` and `2048px.png`.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The variant pipeline: parameters, dimension math, backend trait, `image`-crate backend |
//! | [`archive`] | ZIP packing of finished variants |
//! | [`pipeline`] | One request end to end: decode, three variants, pack; error kinds |
//! | [`config`] | `png-trio.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Width Wins
//!
//! Variants are sized by width only. Height is recomputed as
//! `floor(source_height * width / source_width)` in integer arithmetic, so the
//! aspect ratio is preserved exactly and small sources are upscaled rather
//! than skipped.
//!
//! ## Crops Fail Instead of Clamping
//!
//! Crop coordinates refer to each resized variant, so a box that fits the
//! 2048 px variant may not fit the 20 px one. Such a request fails with an
//! error naming the variant and the overflowing axis; nothing is clamped,
//! because a silently shrunk crop is indistinguishable from a correct one.
//!
//! ## All or Nothing
//!
//! All three plans are validated before pixels are touched, and the archive
//! is packed only after all three encodes succeed. A caller never sees an
//! archive with fewer than three entries.
//!
//! ## Deterministic Output
//!
//! The resampling filter is a named constant
//! ([`RESAMPLE_FILTER`](imaging::RESAMPLE_FILTER)), PNG encoding uses fixed
//! settings, and archive timestamps are pinned. The same upload and
//! parameters always produce byte-identical archives.

pub mod archive;
pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;
