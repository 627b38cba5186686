//! Batch analysis for e-commerce order exports.
//!
//! Takes a raw CSV of orders, repairs the usual data-entry damage, and turns
//! the result into a console report plus a set of PNG charts:
//!
//! - **Load**: read the export and verify the expected columns are present
//! - **Clean**: fill missing categoricals, repair quantities, coerce amounts,
//!   drop duplicate rows, and write a cleaned CSV snapshot
//! - **Aggregate**: totals, averages and rankings by category, region,
//!   customer and payment method, plus delivery outcome measures
//! - **Report**: a fixed-order plain-text report on any writer
//! - **Chart**: five PNGs covering sales, payments, amounts, trend and
//!   delivery status
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use order_insights::{AnalysisConfig, AnalysisPipeline, render_report};
//!
//! let config = AnalysisConfig::builder()
//!     .input_path("data/ecommerce_orders.csv")
//!     .build()?;
//! let report = AnalysisPipeline::new(config).run()?;
//! render_report(&mut std::io::stdout().lock(), &report)?;
//! ```

pub mod analysis;
pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod utils;

pub use analysis::{CrosstabCounts, OrderAggregates, OrderAnalyzer, summarize_dataset};
pub use cleaner::OrderCleaner;
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use error::{AnalysisError, Result};
pub use loader::load_orders;
pub use pipeline::AnalysisPipeline;
pub use report::{AnalysisReport, render_report};
pub use types::{CleaningSummary, DatasetOverview};
