//! Configuration module.
//!
//! Handles loading and validating `png-trio.toml`. Stock defaults are
//! overridden by the user's config file, which in turn is overridden by
//! command-line flags (see `main.rs`).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [transform]
//! sharpen = 1.2             # Sharpening strength, 0 (none) to 3 (strong)
//! rotation = "none"         # none | rotate-90 | rotate-180 | rotate-270
//!                           # | flip-horizontal | flip-vertical
//!
//! [transform.crop]          # In pixels of each resized variant
//! left = 0
//! top = 0
//! width = 0                 # Leave width or height at 0 for no crop
//! height = 0
//!
//! [processing]
//! parallel = true           # Produce the three variants concurrently
//! max_threads = 4           # Omit for auto (= CPU cores)
//!
//! [output]
//! archive_name = "3_resized_images.zip"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! [transform]
//! sharpen = 0
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::archive::ARCHIVE_FILE_NAME;
use crate::imaging::{CropRegion, Rotation, SharpenStrength, TransformParams};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `png-trio.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Default transform parameters for each request.
    pub transform: TransformConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Where results go.
    pub output: OutputConfig,
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.transform.to_params()?;
        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_threads must be at least 1".into(),
            ));
        }
        if self.output.archive_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output.archive_name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Default transform parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformConfig {
    /// Sharpening strength, 0 to 3.
    pub sharpen: f32,
    pub rotation: Rotation,
    pub crop: CropConfig,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            sharpen: 1.2,
            rotation: Rotation::None,
            crop: CropConfig::default(),
        }
    }
}

impl TransformConfig {
    /// Convert to validated pipeline parameters.
    pub fn to_params(&self) -> Result<TransformParams, ConfigError> {
        let sharpen = SharpenStrength::new(self.sharpen)
            .map_err(|e| ConfigError::Validation(format!("transform.sharpen: {e}")))?;
        Ok(TransformParams {
            sharpen,
            crop: self.crop.region(),
            rotation: self.rotation,
        })
    }
}

/// Raw crop fields. Zero width or height means no crop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CropConfig {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl CropConfig {
    pub fn region(&self) -> Option<CropRegion> {
        CropRegion::from_fields(self.left, self.top, self.width, self.height)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Produce the three variants concurrently.
    pub parallel: bool,
    /// Maximum number of worker threads.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            max_threads: None,
        }
    }
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// File name for the archive when no `--output` is given.
    pub archive_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            archive_name: ARCHIVE_FILE_NAME.to_string(),
        }
    }
}

/// Load config from the given file.
///
/// The file is sparse: `#[serde(default)]` fills every key it leaves out.
/// Unknown keys are rejected and the result is validated. A missing file
/// yields the stock defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `png-trio.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# png-trio Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Default transform, applied to all three variants (20 / 200 / 2048 px)
# ---------------------------------------------------------------------------
[transform]
# Sharpening strength: 0 = none, 3 = strong.
sharpen = 1.2

# One of: none, rotate-90, rotate-180, rotate-270 (all clockwise),
# flip-horizontal, flip-vertical.
rotation = "none"

# Crop box in pixels of each resized variant. Leave width or height at 0
# for no crop. A box that does not fit a variant is an error.
[transform.crop]
left = 0
top = 0
width = 0
height = 0

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Produce the three variants concurrently.
parallel = true

# Maximum worker threads.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Archive file name when --output is not given.
archive_name = "3_resized_images.zip"
"##
}
