//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! Source: photo.jpg (1000x500)
//!     Sharpen: 1.2
//!     Crop: none
//!     Rotation: none
//!
//! Variants
//!     20px.png      20x10       512 B
//!     200px.png     200x100     21.4 KB
//!     2048px.png    2048x1024   1.9 MB
//!
//! Archive → 3_resized_images.zip (3 entries, 2.0 MB)
//! ```
//!
//! # Architecture
//!
//! Each section has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure — no I/O, no side effects.

use crate::imaging::{Dimensions, TransformParams};
use crate::pipeline::Bundle;
use std::path::Path;

/// Human-readable byte count.
pub fn human_bytes(bytes: usize) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// Request header: source file and the transform being applied.
pub fn format_request(source: &Path, dims: Dimensions, params: &TransformParams) -> Vec<String> {
    let name = source
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string());

    let sharpen = if params.sharpen.is_active() {
        format!("{}", params.sharpen.value())
    } else {
        "none".to_string()
    };
    let crop = match &params.crop {
        Some(c) => format!("{}x{} at ({}, {})", c.width, c.height, c.left, c.top),
        None => "none".to_string(),
    };

    vec![
        format!("Source: {} ({})", name, dims),
        format!("    Sharpen: {}", sharpen),
        format!("    Crop: {}", crop),
        format!("    Rotation: {}", params.rotation.label()),
    ]
}

/// One line per variant: name, final size, encoded size.
pub fn format_variants(bundle: &Bundle) -> Vec<String> {
    let mut lines = vec!["Variants".to_string()];
    for variant in &bundle.variants {
        lines.push(format!(
            "    {:<12}  {:<10}  {}",
            variant.file_name,
            variant.dimensions.to_string(),
            human_bytes(variant.png.len())
        ));
    }
    lines
}

pub fn format_archive(bundle: &Bundle, path: &Path) -> Vec<String> {
    vec![format!(
        "Archive → {} ({} entries, {})",
        path.display(),
        bundle.variants.len(),
        human_bytes(bundle.archive.len())
    )]
}

/// Preview files written next to the archive.
pub fn format_previews(paths: &[std::path::PathBuf]) -> Vec<String> {
    let mut lines = vec!["Previews".to_string()];
    lines.extend(paths.iter().map(|p| format!("    {}", p.display())));
    lines
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

pub fn print_bundle(source: &Path, bundle: &Bundle, archive: &Path) {
    print_lines(&format_request(source, bundle.source, &bundle.params));
    println!();
    print_lines(&format_variants(bundle));
    println!();
    print_lines(&format_archive(bundle, archive));
}
