//! End-to-end tests through the public API with the real `image` backend.
//!
//! Run with: cargo test --test variants

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use png_trio::imaging::{
    CropRegion, Dimensions, ImageBackend, Rotation, RustBackend, SharpenStrength,
    TransformParams, produce_variant,
};
use png_trio::pipeline::{ErrorKind, Pipeline, generate};
use std::io::{Cursor, Read};

/// Checkerboard with a gradient overlay: lots of edges, no symmetry.
fn textured(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        let check = if (x / 8 + y / 8) % 2 == 0 { 60 } else { 190 };
        Rgb([
            check,
            (x * 255 / width) as u8,
            (y * 255 / height) as u8,
        ])
    }))
}

fn upload(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, format).unwrap();
    bytes.into_inner()
}

fn entries(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    (0..zip.len())
        .map(|i| {
            let mut entry = zip.by_index(i).unwrap();
            let mut bytes = Vec::new();
            entry.read_to_end(&mut bytes).unwrap();
            (entry.name().to_string(), bytes)
        })
        .collect()
}

fn decode_png(bytes: &[u8]) -> DynamicImage {
    assert_eq!(image::guess_format(bytes).unwrap(), ImageFormat::Png);
    image::load_from_memory(bytes).unwrap()
}

fn params(sharpen: f32, crop: Option<CropRegion>, rotation: Rotation) -> TransformParams {
    TransformParams {
        sharpen: SharpenStrength::new(sharpen).unwrap(),
        crop,
        rotation,
    }
}

#[test]
fn landscape_source_produces_three_sized_pngs() {
    let bytes = upload(&textured(1000, 500), ImageFormat::Png);
    let bundle = generate(&bytes, &TransformParams::default()).unwrap();

    assert_eq!(bundle.source, Dimensions { width: 1000, height: 500 });

    let archived = entries(&bundle.archive);
    let names: Vec<_> = archived.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["20px.png", "200px.png", "2048px.png"]);

    let sizes: Vec<_> = archived
        .iter()
        .map(|(_, png)| {
            let img = decode_png(png);
            (img.width(), img.height())
        })
        .collect();
    assert_eq!(sizes, vec![(20, 10), (200, 100), (2048, 1024)]);

    // Archive entries are exactly the variant bytes.
    for ((_, png), variant) in archived.iter().zip(&bundle.variants) {
        assert_eq!(png, &variant.png);
    }
}

#[test]
fn repeated_runs_are_byte_identical() {
    let bytes = upload(&textured(1000, 500), ImageFormat::Png);
    let first = generate(&bytes, &TransformParams::default()).unwrap();
    let second = Pipeline::new()
        .parallel(false)
        .run(&bytes, &TransformParams::default())
        .unwrap();

    assert_eq!(first.archive, second.archive);
}

#[test]
fn every_upload_format_is_accepted() {
    let source = textured(120, 90);
    for format in [
        ImageFormat::Png,
        ImageFormat::Jpeg,
        ImageFormat::WebP,
        ImageFormat::Bmp,
        ImageFormat::Tiff,
    ] {
        let bundle = generate(&upload(&source, format), &TransformParams::default())
            .unwrap_or_else(|e| panic!("{format:?}: {e}"));
        assert_eq!(bundle.variants[1].dimensions, Dimensions { width: 200, height: 150 });
    }
}

#[test]
fn non_image_upload_is_decode_error() {
    let err = generate(b"plain text, not pixels", &TransformParams::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn zero_strength_matches_skipping_sharpen() {
    let backend = RustBackend::new();
    let source = backend.decode(&upload(&textured(300, 200), ImageFormat::Png)).unwrap();

    let produced = produce_variant(&backend, &source, 200, &TransformParams::default()).unwrap();

    let resized = backend
        .resize(&source, Dimensions { width: 200, height: 133 })
        .unwrap();
    let manual = backend.encode_png(&resized).unwrap();
    assert_eq!(produced.png, manual);

    // And the filter itself is the identity at factor 1.0.
    let unsharpened = backend.sharpen(resized.clone(), 1.0).unwrap();
    assert_eq!(unsharpened, resized);
}

#[test]
fn sharpening_changes_pixels() {
    let backend = RustBackend::new();
    let source = backend.decode(&upload(&textured(400, 400), ImageFormat::Png)).unwrap();

    let plain = produce_variant(&backend, &source, 200, &TransformParams::default()).unwrap();
    let sharp =
        produce_variant(&backend, &source, 200, &params(3.0, None, Rotation::None)).unwrap();

    assert_eq!(plain.dimensions, sharp.dimensions);
    assert_ne!(decode_png(&plain.png), decode_png(&sharp.png));
}

#[test]
fn quarter_turn_and_back_restores_pixels() {
    let backend = RustBackend::new();
    let source = backend.decode(&upload(&textured(500, 300), ImageFormat::Png)).unwrap();

    let straight = produce_variant(&backend, &source, 200, &TransformParams::default()).unwrap();
    let turned =
        produce_variant(&backend, &source, 200, &params(0.0, None, Rotation::Rotate90)).unwrap();

    assert_eq!(turned.dimensions, Dimensions { width: 120, height: 200 });
    let restored = backend.orient(decode_png(&turned.png), Rotation::Rotate270);
    assert_eq!(restored, decode_png(&straight.png));

    let half =
        produce_variant(&backend, &source, 200, &params(0.0, None, Rotation::Rotate180)).unwrap();
    let restored = backend.orient(decode_png(&half.png), Rotation::Rotate180);
    assert_eq!(restored, decode_png(&straight.png));
}

#[test]
fn flip_twice_restores_pixels() {
    let backend = RustBackend::new();
    let source = backend.decode(&upload(&textured(500, 300), ImageFormat::Png)).unwrap();

    let straight = produce_variant(&backend, &source, 200, &TransformParams::default()).unwrap();
    for flip in [Rotation::FlipHorizontal, Rotation::FlipVertical] {
        let flipped = produce_variant(&backend, &source, 200, &params(0.0, None, flip)).unwrap();
        assert_eq!(flipped.dimensions, straight.dimensions);
        let restored = backend.orient(decode_png(&flipped.png), flip);
        assert_eq!(restored, decode_png(&straight.png), "{flip}");
    }
}

#[test]
fn crop_applies_after_resize_to_every_variant() {
    let bytes = upload(&textured(1000, 500), ImageFormat::Png);
    let crop = CropRegion::from_fields(2, 1, 12, 6);

    let bundle = generate(&bytes, &params(0.0, crop, Rotation::None)).unwrap();
    for variant in &bundle.variants {
        assert_eq!(variant.dimensions, Dimensions { width: 12, height: 6 });
        let img = decode_png(&variant.png);
        assert_eq!((img.width(), img.height()), (12, 6));
    }

    let turned = generate(&bytes, &params(0.0, crop, Rotation::Rotate270)).unwrap();
    assert!(
        turned
            .variants
            .iter()
            .all(|v| v.dimensions == Dimensions { width: 6, height: 12 })
    );
}

#[test]
fn crop_larger_than_smallest_variant_fails() {
    let bytes = upload(&textured(1000, 500), ImageFormat::Png);
    let crop = CropRegion::from_fields(0, 0, 50, 50);

    let err = generate(&bytes, &params(1.2, crop, Rotation::None)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCrop);
    let message = err.to_string();
    assert!(message.contains("20px"), "{message}");
    assert!(message.contains("width"), "{message}");
}

#[test]
fn tall_narrow_source_fails_instead_of_allocating() {
    // A few KB on disk, but 2048 px wide it would need terabytes
    let strip = RgbImage::from_pixel(1, 1_500_000, Rgb([90, 120, 150]));
    let bytes = upload(&DynamicImage::ImageRgb8(strip), ImageFormat::Png);

    let err = generate(&bytes, &TransformParams::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSource);
}

#[test]
fn previews_match_archive_entries() {
    let bytes = upload(&textured(640, 480), ImageFormat::Jpeg);
    let bundle = generate(&bytes, &params(1.2, None, Rotation::FlipVertical)).unwrap();

    let previews = bundle.previews().unwrap();
    let archived = entries(&bundle.archive);
    assert_eq!(previews.len(), 3);
    for ((name, img), (entry_name, png)) in previews.iter().zip(&archived) {
        assert_eq!(name, entry_name);
        assert_eq!(img, &decode_png(png));
    }
}
