//! Gazemap CLI: aggregate gaze sample streams into attention maps.
//!
//! Usage:
//!   gazemap replay <FILE>    Re-aggregate a recorded JSONL sample stream
//!   gazemap live             Aggregate samples from stdin, snapshots to stdout
//!   gazemap config           Show or initialize the configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gazemap_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "gazemap",
    about = "Time-weighted gaze attention maps from streaming eye-tracking samples",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct HeatmapArgs {
    /// Bucket edge length in surface units
    #[arg(long)]
    grid_size: Option<u32>,

    /// Minimum share of total dwell time (percent) for a bucket to be shown
    #[arg(long)]
    noise_floor: Option<f64>,

    /// Viewing-surface width
    #[arg(long)]
    width: Option<f64>,

    /// Viewing-surface height
    #[arg(long)]
    height: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded JSONL sample stream
    Replay {
        /// Path to the samples file
        path: PathBuf,

        #[command(flatten)]
        heatmap: HeatmapArgs,

        /// Write snapshots as JSONL to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write every publish tick, not only the final snapshot
        #[arg(long)]
        all: bool,
    },

    /// Aggregate JSONL samples from stdin and stream snapshots to stdout
    Live {
        #[command(flatten)]
        heatmap: HeatmapArgs,

        /// Publish period in milliseconds
        #[arg(long)]
        period_ms: Option<u64>,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration to the standard location
        #[arg(long)]
        init: bool,
    },
}

impl HeatmapArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(grid_size) = self.grid_size {
            config.heatmap.grid_size = grid_size;
        }
        if let Some(noise_floor) = self.noise_floor {
            config.heatmap.noise_floor_percent = noise_floor;
        }
        if let Some(width) = self.width {
            config.surface.width = width;
        }
        if let Some(height) = self.height {
            config.surface.height = height;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };

    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    gazemap_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Replay {
            path,
            heatmap,
            output,
            all,
        } => {
            heatmap.apply(&mut config);
            config.validate()?;
            commands::replay::run(path, config, output, all)
        }
        Commands::Live { heatmap, period_ms } => {
            heatmap.apply(&mut config);
            if let Some(period_ms) = period_ms {
                config.heatmap.publish_period_ms = period_ms;
            }
            config.validate()?;
            commands::live::run(config).await
        }
        Commands::Config { init } => commands::config::run(&config, init),
    }
}
