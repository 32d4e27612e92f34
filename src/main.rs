//! Tour hype - ticket price tiers, hype index and sell-out risk for live events
//!
//! Reads an exported record set of artist tracks and upcoming events, pulls
//! seat prices from each event page and writes a ranked watchlist.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

// Use the library crate
use tour_hype::cli::commands::{self, EnrichOptions};
use tour_hype::config::Config;

/// Tour hype - rank upcoming events by demand signals
#[derive(Parser)]
#[command(name = "hype")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "hype.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich events with price tiers, hype index and sell-out risk
    Enrich {
        /// Path to a *_data.json record set (default: latest under data.raw_dir)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Prefer the latest input file for this artist
        #[arg(short, long)]
        artist: Option<String>,

        /// Existing output directory (default: data.enriched_dir)
        #[arg(short, long)]
        outdir: Option<PathBuf>,

        /// JSON array of per-event annotations, in event order
        #[arg(long)]
        annotations: Option<PathBuf>,

        /// Reference date for day offsets, YYYY-MM-DD (default: today, UTC)
        #[arg(long, env = "HYPE_TODAY")]
        today: Option<NaiveDate>,
    },

    /// Run price extraction on one page (local HTML file or URL)
    Extract {
        /// File path or http(s) URL
        source: String,
    },

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tour_hype=info".parse().unwrap()),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Enrich {
            input,
            artist,
            outdir,
            annotations,
            today,
        } => {
            commands::enrich(
                &config,
                EnrichOptions {
                    input,
                    artist,
                    outdir,
                    annotations,
                    today,
                },
            )
            .await
        }
        Commands::Extract { source } => commands::extract(&config, &source).await,
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        if commands::is_fatal(&e) {
            error!("Cannot run: {}", e);
        } else {
            error!("Command failed: {:#}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}
