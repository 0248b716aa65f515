use clap::{Parser, Subcommand};
use png_trio::imaging::supported_input_extensions;
use png_trio::{config, output, pipeline};
use std::path::{Path, PathBuf};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("PNG_TRIO_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("PNG_TRIO_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "png-trio")]
#[command(about = "Resize one image into 20 / 200 / 2048 px PNGs, bundled as a ZIP")]
#[command(long_about = "\
Resize one image into 20 / 200 / 2048 px PNGs, bundled as a ZIP

Each variant runs the same fixed pipeline:

  resize (width fixed, height keeps the aspect ratio, Lanczos3)
    → sharpen (0 = none, 3 = strong)
    → crop (pixels of the resized variant; width or height 0 = no crop)
    → rotate / flip
    → encode PNG

The archive holds 20px.png, 200px.png and 2048px.png. A crop that does not
fit every variant is an error; nothing is written in that case.

Defaults come from png-trio.toml when present. Run 'png-trio gen-config'
to print a documented config file.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (optional; stock defaults apply when missing)
    #[arg(long, default_value = "png-trio.toml", global = true)]
    config: PathBuf,

    /// Log every pipeline step to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Produce the three variants and the archive
    Generate(GenerateArgs),
    /// Print a stock png-trio.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Image to resize (jpg, jpeg, png, webp, bmp, tiff)
    input: PathBuf,

    /// Archive path [default: output.archive_name from config]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Sharpening strength, 0 to 3
    #[arg(long)]
    sharpen: Option<f32>,

    /// Crop box left edge
    #[arg(long)]
    crop_left: Option<u32>,

    /// Crop box top edge
    #[arg(long)]
    crop_top: Option<u32>,

    /// Crop box width (0 = no crop)
    #[arg(long)]
    crop_width: Option<u32>,

    /// Crop box height (0 = no crop)
    #[arg(long)]
    crop_height: Option<u32>,

    /// none, rotate-90, rotate-180, rotate-270, flip-horizontal, flip-vertical
    #[arg(long)]
    rotate: Option<String>,

    /// Also write each variant as a standalone PNG into this directory
    #[arg(long)]
    preview_dir: Option<PathBuf>,

    /// Produce variants one after another instead of concurrently
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Generate(args) => {
            let app_config = config::load_config(&cli.config)?;
            init_thread_pool(&app_config.processing);

            warn_on_unknown_extension(&args.input);
            let upload = std::fs::read(&args.input)?;

            let (sharpen, crop, rotation) = resolve_inputs(&args, &app_config.transform);
            let bundle = pipeline::Pipeline::new()
                .parallel(app_config.processing.parallel && !args.sequential)
                .run_inputs(&upload, sharpen, crop, &rotation)
                .inspect_err(|err| error!(kind = ?err.kind(), "request failed"))?;

            let archive_path = args
                .output
                .unwrap_or_else(|| PathBuf::from(&app_config.output.archive_name));
            if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&archive_path, &bundle.archive)?;
            output::print_bundle(&args.input, &bundle, &archive_path);

            if let Some(dir) = args.preview_dir {
                std::fs::create_dir_all(&dir)?;
                let mut written = Vec::new();
                for variant in &bundle.variants {
                    let path = dir.join(&variant.file_name);
                    std::fs::write(&path, &variant.png)?;
                    written.push(path);
                }
                println!();
                output::print_lines(&output::format_previews(&written));
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Layer command-line flags over the configured defaults.
///
/// Values stay raw here; the pipeline validates them.
fn resolve_inputs(
    args: &GenerateArgs,
    defaults: &config::TransformConfig,
) -> (f32, [u32; 4], String) {
    let crop = [
        args.crop_left.unwrap_or(defaults.crop.left),
        args.crop_top.unwrap_or(defaults.crop.top),
        args.crop_width.unwrap_or(defaults.crop.width),
        args.crop_height.unwrap_or(defaults.crop.height),
    ];
    let rotation = args
        .rotate
        .clone()
        .unwrap_or_else(|| defaults.rotation.name().to_string());
    (args.sharpen.unwrap_or(defaults.sharpen), crop, rotation)
}

/// Content sniffing decides the format; an odd extension only earns a warning.
fn warn_on_unknown_extension(path: &Path) {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !supported_input_extensions().contains(&ext.as_str()) {
        warn!(
            path = %path.display(),
            expected = ?supported_input_extensions(),
            "unexpected file extension; format will be detected from contents"
        );
    }
}
