//! ZIP packing of finished variants.
//!
//! Each variant becomes one deflate-compressed entry named by its file name
//! (`20px.png`, `200px.png`, `2048px.png`), written in the order received.
//! Entry timestamps are pinned to the ZIP epoch (1980-01-01 00:00), so the
//! same variants always pack to byte-identical archives.

use crate::imaging::VariantOutput;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Suggested download name for the archive.
pub const ARCHIVE_FILE_NAME: &str = "3_resized_images.zip";

/// MIME type to serve the archive with.
pub const ARCHIVE_MIME_TYPE: &str = "application/zip";

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Duplicate archive entry: {0}")]
    DuplicateEntry(String),
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
}

/// Pack variants into an in-memory ZIP archive.
pub fn pack(variants: &[VariantOutput]) -> Result<Vec<u8>, ArchiveError> {
    let mut seen = HashSet::new();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for variant in variants {
        if !seen.insert(variant.file_name.as_str()) {
            return Err(ArchiveError::DuplicateEntry(variant.file_name.clone()));
        }
        writer.start_file(variant.file_name.as_str(), entry_options())?;
        writer.write_all(&variant.png)?;
    }

    Ok(writer.finish()?.into_inner())
}
