//! Parameter types for the variant pipeline.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the caller collecting user input and the
//! [`operations`](super::operations) module, which turns them into backend
//! calls. Everything here is `Copy`: one [`TransformParams`] is shared
//! read-only by all three variant runs of a request.
//!
//! ## Types
//!
//! - [`SharpenStrength`] — Sharpness boost in `[0, 3]`. Validated on construction.
//! - [`CropRegion`] — Crop box in post-resize pixel coordinates.
//! - [`Rotation`] — The closed set of rotate/flip options.
//! - [`TransformParams`] — All of the above for one request.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The fixed output widths, in archive order.
pub const VARIANT_WIDTHS: [u32; 3] = [20, 200, 2048];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamError {
    #[error("sharpen strength must be between 0 and 3, got {0}")]
    SharpenOutOfRange(f32),
    #[error(
        "unknown rotation '{0}' (expected one of: {names})",
        names = Rotation::names().join(", ")
    )]
    UnknownRotation(String),
}

/// Sharpness boost applied after resizing (0 = untouched, 3 = strong).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct SharpenStrength(f32);

impl SharpenStrength {
    pub const MAX: f32 = 3.0;

    /// Rejects NaN and anything outside `[0, 3]`.
    pub fn new(value: f32) -> Result<Self, ParamError> {
        if (0.0..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ParamError::SharpenOutOfRange(value))
        }
    }

    pub fn none() -> Self {
        Self(0.0)
    }

    pub fn value(self) -> f32 {
        self.0
    }

    pub fn is_active(self) -> bool {
        self.0 > 0.0
    }

    /// Enhancement factor handed to the filter: `1 + strength`, so 1.0 is identity.
    pub fn factor(self) -> f32 {
        1.0 + self.0
    }
}

/// Crop box in the resized image's pixel coordinates.
///
/// Only exists when both extents are non-zero; see [`CropRegion::from_fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Build a crop from the four raw input fields.
    ///
    /// Returns `None` (no crop) unless both `width` and `height` are positive,
    /// matching the "leave 0 for no crop" input convention.
    pub fn from_fields(left: u32, top: u32, width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self {
            left,
            top,
            width,
            height,
        })
    }

    /// Exclusive right edge. Widened so huge inputs cannot wrap.
    pub fn right(&self) -> u64 {
        u64::from(self.left) + u64::from(self.width)
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        u64::from(self.top) + u64::from(self.height)
    }
}

/// The rotate/flip step. At most one is applied per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rotation {
    #[default]
    None,
    /// 90° clockwise.
    #[serde(rename = "rotate-90")]
    Rotate90,
    #[serde(rename = "rotate-180")]
    Rotate180,
    /// 270° clockwise.
    #[serde(rename = "rotate-270")]
    Rotate270,
    /// Mirror left-right.
    FlipHorizontal,
    /// Mirror top-bottom.
    FlipVertical,
}

/// Stable name and human label for every option.
///
/// Labels are what an interactive front end shows in its picker; both forms
/// are accepted by [`Rotation::from_str`].
const ROTATION_NAMES: [(Rotation, &str, &str); 6] = [
    (Rotation::None, "none", "None"),
    (Rotation::Rotate90, "rotate-90", "90° clockwise"),
    (Rotation::Rotate180, "rotate-180", "180°"),
    (Rotation::Rotate270, "rotate-270", "270° clockwise"),
    (Rotation::FlipHorizontal, "flip-horizontal", "Flip horizontal"),
    (Rotation::FlipVertical, "flip-vertical", "Flip vertical"),
];

impl Rotation {
    pub const ALL: [Rotation; 6] = [
        Rotation::None,
        Rotation::Rotate90,
        Rotation::Rotate180,
        Rotation::Rotate270,
        Rotation::FlipHorizontal,
        Rotation::FlipVertical,
    ];

    fn entry(self) -> (Rotation, &'static str, &'static str) {
        ROTATION_NAMES[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn label(self) -> &'static str {
        self.entry().2
    }

    pub fn names() -> Vec<&'static str> {
        ROTATION_NAMES.iter().map(|(_, name, _)| *name).collect()
    }

    /// Quarter turns swap width and height; flips and half turns don't.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Rotate90 | Rotation::Rotate270)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Rotation {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ROTATION_NAMES
            .iter()
            .find(|(_, name, label)| {
                name.eq_ignore_ascii_case(wanted) || label.eq_ignore_ascii_case(wanted)
            })
            .map(|(rotation, _, _)| *rotation)
            .ok_or_else(|| ParamError::UnknownRotation(s.to_string()))
    }
}

/// Everything the pipeline needs to know about one request besides the image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformParams {
    pub sharpen: SharpenStrength,
    pub crop: Option<CropRegion>,
    pub rotation: Rotation,
}

impl TransformParams {
    /// Validate raw form inputs: a sharpen value, the four crop fields
    /// (`[left, top, width, height]`, zeros for no crop), and a rotation name
    /// or label.
    pub fn from_inputs(sharpen: f32, crop: [u32; 4], rotation: &str) -> Result<Self, ParamError> {
        let [left, top, width, height] = crop;
        Ok(Self {
            sharpen: SharpenStrength::new(sharpen)?,
            crop: CropRegion::from_fields(left, top, width, height),
            rotation: rotation.parse()?,
        })
    }
}
