//! Shared test utilities for the png-trio test suite.
//!
//! Provides synthetic source images, in-memory encoders for every upload
//! format, and archive inspection helpers.
//!
//! # Usage
//!
//! ```text
//! use crate::test_helpers::*;
//!
//! let upload = encode_as(&DynamicImage::ImageRgb8(gradient_rgb(1000, 500)), ImageFormat::Png);
//! let bundle = generate(&upload, &TransformParams::default()).unwrap();
//!
//! assert_eq!(zip_entry_names(&bundle.archive), ["20px.png", "200px.png", "2048px.png"]);
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::{Cursor, Read};

// =========================================================================
// Synthetic images
// =========================================================================

/// RGB image with distinct values along both axes, so flips and rotations
/// are always observable.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x * 7 + y * 13) % 256) as u8,
        ])
    })
}

/// RGBA variant of [`gradient_rgb`] with a varying alpha channel.
pub fn gradient_rgba(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x * 7 + y * 13) % 256) as u8,
            (255 - (x + y) % 64) as u8,
        ])
    })
}

/// Encode an image in memory, as an upload would arrive.
pub fn encode_as(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, format)
        .unwrap_or_else(|e| panic!("failed to encode test image as {format:?}: {e}"));
    bytes.into_inner()
}

/// A PNG upload of a [`gradient_rgb`] source.
pub fn png_upload(width: u32, height: u32) -> Vec<u8> {
    encode_as(&DynamicImage::ImageRgb8(gradient_rgb(width, height)), ImageFormat::Png)
}

// =========================================================================
// Archive inspection — panics with a clear message on malformed input
// =========================================================================

/// Entry names in archive order.
pub fn zip_entry_names(archive: &[u8]) -> Vec<String> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).expect("archive must be a valid ZIP");
    (0..zip.len())
        .map(|i| zip.by_index(i).expect("entry must be readable").name().to_string())
        .collect()
}

/// Decompressed contents of a named entry. Panics if not found.
pub fn read_zip_entry(archive: &[u8], name: &str) -> Vec<u8> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).expect("archive must be a valid ZIP");
    let mut entry = zip.by_name(name).unwrap_or_else(|e| {
        let names = zip_entry_names(archive);
        panic!("entry '{name}' not found ({e}). Available: {names:?}")
    });
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes).expect("entry must decompress");
    bytes
}
