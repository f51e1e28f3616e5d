// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SolarLens.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solarlens_core::{Analyzer, export};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "solarlens", version)]
#[command(about = "Hourly solar generation analysis with anomaly detection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze a CSV file and write the summary and labeled series
    Analyze {
        /// Input CSV with Timestamp and SolarGeneration columns
        #[arg(long)]
        csv: PathBuf,

        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the detection strategy (zscore or ensemble)
        #[arg(long)]
        strategy: Option<String>,

        /// Override the z-score threshold
        #[arg(long)]
        threshold: Option<f64>,

        /// Directory for weekly_summary.txt and the labeled CSV
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Start the upload and dashboard web server
    Serve {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the listening port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respects RUST_LOG environment variable
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Setting default subscriber failed")?;

    match cli.command {
        Command::Analyze {
            csv,
            config,
            strategy,
            threshold,
            out_dir,
        } => {
            let mut app_config = AppConfig::load(config.as_deref())?;
            if let Some(strategy) = strategy {
                app_config.analysis.detection.strategy = strategy;
            }
            if let Some(threshold) = threshold {
                app_config.analysis.detection.threshold = threshold;
            }
            analyze(app_config, &csv, &out_dir)
        }
        Command::Serve { config, port } => {
            let mut app_config = AppConfig::load(config.as_deref())?;
            if let Some(port) = port {
                app_config.server.port = port;
            }
            serve(app_config)
        }
    }
}

fn analyze(app_config: AppConfig, csv: &Path, out_dir: &Path) -> Result<()> {
    let analyzer = Analyzer::new(app_config.analysis).context("Invalid detection settings")?;
    info!("📂 Analyzing {} with {}", csv.display(), analyzer.strategy());

    let result = analyzer
        .run_path(csv)
        .with_context(|| format!("Failed to analyze {}", csv.display()))?;

    let paths = export::write_outputs(&result, out_dir).context("Failed to write outputs")?;

    println!("{}", result.narrative());
    println!(
        "Hours: {}, anomalous: {}, rows used: {}, rows dropped: {}",
        result.buckets.len(),
        result.anomaly_count(),
        result.retained_rows,
        result.dropped_rows
    );
    info!("📝 Summary written to {}", paths.summary.display());
    info!("📊 Labeled series written to {}", paths.labeled_csv.display());
    Ok(())
}

fn serve(app_config: AppConfig) -> Result<()> {
    let analyzer = Analyzer::new(app_config.analysis).context("Invalid detection settings")?;
    info!("🚀 Starting SolarLens web server ({} strategy)", analyzer.strategy());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    runtime
        .block_on(solarlens_web::start_web_server(analyzer, app_config.server))
        .context("Web server failed")
}
