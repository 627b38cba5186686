//! End-to-end pipeline: load, summarize, clean, snapshot, aggregate, chart.
//!
//! Stages run synchronously in a fixed order; each one consumes the previous
//! stage's output and any failure aborts the run.

use crate::analysis::{OrderAnalyzer, summarize_dataset};
use crate::charts;
use crate::cleaner::OrderCleaner;
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result, ResultExt};
use crate::loader::load_orders;
use crate::report::AnalysisReport;
use polars::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

/// Runs the whole analysis over one order export.
///
/// # Example
///
/// ```rust,ignore
/// use order_insights::{AnalysisConfig, AnalysisPipeline};
///
/// let config = AnalysisConfig::builder()
///     .input_path("data/ecommerce_orders.csv")
///     .build()?;
/// let report = AnalysisPipeline::new(config).run()?;
/// println!("{} rows analyzed", report.cleaning.rows_after);
/// ```
pub struct AnalysisPipeline {
    config: AnalysisConfig,
}

impl AnalysisPipeline {
    /// Build a pipeline over a validated configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Run every stage and collect the results for reporting.
    pub fn run(&self) -> Result<AnalysisReport> {
        let started = Instant::now();
        info!("Starting analysis of {}", self.config.input_path.display());

        let df = load_orders(&self.config.input_path)?;
        if df.height() == 0 {
            return Err(AnalysisError::EmptyTable);
        }

        let overview = summarize_dataset(&df)?;
        let (cleaned, cleaning) = OrderCleaner.clean(df)?;
        self.write_cleaned_snapshot(&cleaned)?;

        let aggregates = OrderAnalyzer.analyze(&cleaned, &self.config)?;

        let chart_files = if self.config.render_charts {
            charts::render_all(
                &aggregates,
                &self.config.charts_dir,
                self.config.histogram_bins,
            )?
        } else {
            debug!("Chart rendering disabled");
            Vec::new()
        };

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            rows = cleaning.rows_after,
            "Pipeline finished"
        );

        Ok(AnalysisReport {
            input_path: self.config.input_path.clone(),
            cleaned_csv_path: self.config.cleaned_csv_path.clone(),
            overview,
            cleaning,
            aggregates,
            chart_files,
        })
    }

    /// Persist the cleaned table as a headered, comma-separated CSV.
    fn write_cleaned_snapshot(&self, df: &DataFrame) -> Result<()> {
        let path = &self.config.cleaned_csv_path;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::File::create(path)?;
        let mut snapshot = df.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut snapshot)
            .context("While writing the cleaned snapshot")?;

        info!("Wrote cleaned snapshot to {}", path.display());
        Ok(())
    }
}
