use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mosaic_tiler::models::AppConfig;
use mosaic_tiler::services::{format_directory, GridMetadataStore, StitchService, Tiler};

#[derive(Parser)]
#[command(name = "mosaic-tiler")]
#[command(about = "Tile multiplexed mosaics for segmentation and stitch the masks back")]
struct Cli {
    /// Configuration file (defaults to CONFIG_FILE, then the embedded config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log every tile and file operation
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut each channel of one or more mosaics into tiles
    Tile {
        /// Multi-page TIFF mosaics, one page per channel
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Channel panel from the configuration
        #[arg(short, long, conflicts_with = "channels")]
        panel: Option<String>,

        /// Custom comma-separated channel names, in page order
        #[arg(short, long, value_delimiter = ',')]
        channels: Option<Vec<String>>,

        /// Tile side length in pixels
        #[arg(short, long)]
        tile_size: Option<usize>,

        /// Parent directory of the tile directories
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Directory for grid metadata records
        #[arg(short, long)]
        metadata_dir: Option<PathBuf>,
    },
    /// Stitch a per-tile mask array into one PNG overlay
    Stitch {
        /// Mask array (.npy) named <prefix>-<source_id>.npy
        mask: PathBuf,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Directory holding grid metadata records
        #[arg(short, long)]
        metadata_dir: Option<PathBuf>,

        /// Crop the padding back to the original mosaic size
        #[arg(long)]
        crop: bool,

        /// Recompress the PNG with oxipng
        #[arg(long)]
        optimize: bool,
    },
    /// Rearrange tiled directories into the segmentation input layout
    Format {
        /// Tiled directories (<source>_dir)
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Move each formatted directory into this directory
        #[arg(short, long)]
        target: Option<PathBuf>,
    },
    /// List configured channel panels
    Panels,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "mosaic_tiler=debug,mosaic_grid=debug"
    } else {
        "mosaic_tiler=info,mosaic_grid=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config_file = cli
        .config
        .clone()
        .or_else(|| std::env::var("CONFIG_FILE").ok().map(PathBuf::from));
    let config = AppConfig::load(config_file.as_deref())?;

    match cli.command {
        Some(Commands::Tile {
            files,
            panel,
            channels,
            tile_size,
            output_dir,
            metadata_dir,
        }) => run_tile_command(
            &config,
            &files,
            panel.as_deref(),
            channels.as_deref(),
            tile_size,
            output_dir,
            metadata_dir,
        ),
        Some(Commands::Stitch {
            mask,
            output,
            metadata_dir,
            crop,
            optimize,
        }) => run_stitch_command(&config, &mask, &output, metadata_dir, crop, optimize),
        Some(Commands::Format { dirs, target }) => run_format_command(&dirs, target.as_deref()),
        Some(Commands::Panels) => {
            run_panels_command(&config);
            Ok(())
        }
        None => {
            run_status_command(&config, config_file.as_deref());
            Ok(())
        }
    }
}

/// Tile every input mosaic, stopping at the first failure
fn run_tile_command(
    config: &AppConfig,
    files: &[PathBuf],
    panel: Option<&str>,
    channels: Option<&[String]>,
    tile_size: Option<usize>,
    output_dir: Option<PathBuf>,
    metadata_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let channels = config.resolve_channels(panel, channels)?;
    let tile_size = tile_size.unwrap_or(config.tile_size);
    let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
    let mut metadata =
        GridMetadataStore::new(metadata_dir.unwrap_or_else(|| config.metadata_dir.clone()));

    tracing::info!(channels = %channels.join(","), tile_size, "Tiling");
    let tiler = Tiler::new(tile_size, output_dir, channels)?;

    for file in files {
        let report = tiler
            .tile_file(file, &mut metadata)
            .with_context(|| format!("Failed to tile {}", file.display()))?;
        println!(
            "Created {} ({} grid, {} tiles in {} channels)",
            report.source_dir.display(),
            report.shape,
            report.tiles_written / report.channels.max(1),
            report.channels
        );
    }
    Ok(())
}

fn run_stitch_command(
    config: &AppConfig,
    mask: &Path,
    output: &Path,
    metadata_dir: Option<PathBuf>,
    crop: bool,
    optimize: bool,
) -> anyhow::Result<()> {
    let service = StitchService::new(metadata_dir.unwrap_or_else(|| config.metadata_dir.clone()))
        .crop(crop)
        .optimize(optimize);

    let report = service
        .stitch_to_png(mask, output)
        .with_context(|| format!("Failed to stitch {}", mask.display()))?;
    println!(
        "Stitched {} ({}x{}, {} foreground pixels, {} bytes)",
        report.output.display(),
        report.width,
        report.height,
        report.foreground,
        report.bytes
    );
    Ok(())
}

fn run_format_command(dirs: &[PathBuf], target: Option<&Path>) -> anyhow::Result<()> {
    for dir in dirs {
        let report = format_directory(dir, target)
            .with_context(|| format!("Failed to format {}", dir.display()))?;
        println!(
            "Formatted {} ({} fovs, {} files moved)",
            report.dir.display(),
            report.fovs,
            report.files_moved
        );
        if !report.relocated {
            println!("Run:\n  mv -v {} <segmentation data directory>", report.dir.display());
        }
    }
    Ok(())
}

fn run_panels_command(config: &AppConfig) {
    for (name, channels) in &config.panels {
        let marker = if config.default_panel.as_deref() == Some(name.as_str()) {
            " (default)"
        } else {
            ""
        };
        println!("{name}{marker}: {}", channels.join(", "));
    }
}

fn run_status_command(config: &AppConfig, config_file: Option<&Path>) {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("mosaic-tiler v{VERSION}");
    println!("Tile multiplexed mosaics for cell segmentation\n");

    println!("Configuration:");
    println!(
        "  Source       = {}",
        config_file
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "embedded".to_string())
    );
    println!("  Tile size    = {}", config.tile_size);
    println!("  Output dir   = {}", config.output_dir.display());
    println!("  Metadata dir = {}", config.metadata_dir.display());
    println!(
        "  Panel        = {}",
        config.default_panel.as_deref().unwrap_or("(none)")
    );
    println!("  Panels       = {}", config.panels.len());

    println!("\nCommands:");
    println!("  mosaic-tiler tile <FILES>...      Cut mosaics into tiles");
    println!("  mosaic-tiler format <DIRS>...     Prepare tiles for segmentation");
    println!("  mosaic-tiler stitch <MASK> -o PNG Stitch masks into an overlay");
    println!("  mosaic-tiler panels               List channel panels");
}
