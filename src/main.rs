//! Command-line entry point for the order analysis pipeline.

use anyhow::Context;
use clap::Parser;
use order_insights::config::{DEFAULT_CHARTS_DIR, DEFAULT_CLEANED_CSV_PATH, DEFAULT_INPUT_PATH};
use order_insights::{AnalysisConfig, AnalysisPipeline, render_report};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "order-insights",
    version,
    about = "Clean, aggregate and chart an e-commerce order export"
)]
struct Args {
    /// CSV export of raw orders
    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    input: PathBuf,

    /// Where the cleaned CSV snapshot is written
    #[arg(long, default_value = DEFAULT_CLEANED_CSV_PATH)]
    cleaned_csv: PathBuf,

    /// Directory the chart PNGs land in, created when missing
    #[arg(long, default_value = DEFAULT_CHARTS_DIR)]
    charts_dir: PathBuf,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Suppress all log output
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    if !args.input.exists() {
        anyhow::bail!("input file {} does not exist", args.input.display());
    }

    let config = AnalysisConfig::builder()
        .input_path(args.input)
        .cleaned_csv_path(args.cleaned_csv)
        .charts_dir(args.charts_dir)
        .render_charts(!args.no_charts)
        .build()
        .context("invalid configuration")?;

    info!("order-insights v{}", env!("CARGO_PKG_VERSION"));
    let report = AnalysisPipeline::new(config)
        .run()
        .context("analysis pipeline failed")?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    render_report(&mut handle, &report).context("failed to render report")?;

    Ok(())
}

fn init_logging(level: &str, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
