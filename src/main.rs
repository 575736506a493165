// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photobooth")]
#[command(about = "Vintage photo booth: timed three-shot capture with film filters")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Alternate filter catalog (JSON array of filters)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available filters
    Filters,

    /// Apply a filter to a single image
    Apply {
        /// Input image
        input: PathBuf,

        /// Filter id (from 'photobooth filters')
        #[arg(short, long)]
        filter: Option<String>,

        /// Output file path (default: ~/Pictures/photobooth/IMG_TIMESTAMP.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a full three-shot session and export the photo strip
    Shoot {
        /// Image files or directories used as the camera
        #[arg(short, long, num_args = 1..)]
        source: Vec<PathBuf>,

        /// V4L2 device to capture from (e.g. /dev/video0)
        #[arg(short, long)]
        device: Option<String>,

        /// Filter id used for every shot
        #[arg(short, long)]
        filter: Option<String>,

        /// One filter id per shot, comma separated
        #[arg(long, value_delimiter = ',')]
        filters: Vec<String>,

        /// Output directory (default: ~/Pictures/photobooth)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep the photos, skip the strip
        #[arg(long)]
        no_strip: bool,

        /// Skip countdown delays
        #[arg(long)]
        fast: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photobooth=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let catalog = cli::load_catalog(cli.catalog.as_deref())?;

    match cli.command {
        Commands::Filters => cli::list_filters(&catalog),
        Commands::Apply {
            input,
            filter,
            output,
        } => cli::apply_filter(&catalog, &input, filter, output),
        Commands::Shoot {
            source,
            device,
            filter,
            filters,
            output,
            no_strip,
            fast,
        } => cli::shoot(
            catalog,
            cli::ShootOptions {
                sources: source,
                device,
                filter,
                filters,
                output,
                strip: !no_strip,
                fast,
            },
        ),
    }
}
