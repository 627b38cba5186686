//! Configuration types for the order analysis pipeline.
//!
//! This module provides configuration options using the builder pattern.
//! Defaults reproduce the fixed relative paths of the batch job, so
//! `AnalysisConfig::default()` is a complete, runnable configuration.

use std::path::PathBuf;

/// Default input file, relative to the working directory.
pub const DEFAULT_INPUT_PATH: &str = "data/ecommerce_orders.csv";
/// Default path for the cleaned CSV snapshot.
pub const DEFAULT_CLEANED_CSV_PATH: &str = "data/ecommerce_cleaned.csv";
/// Default directory for rendered charts.
pub const DEFAULT_CHARTS_DIR: &str = "outputs_charts";

/// Configuration for the analysis pipeline.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use order_insights::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .input_path("data/ecommerce_orders.csv")
///     .render_charts(false)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Path of the input orders CSV.
    /// Default: "data/ecommerce_orders.csv"
    pub input_path: PathBuf,

    /// Path the cleaned table snapshot is written to.
    /// Default: "data/ecommerce_cleaned.csv"
    pub cleaned_csv_path: PathBuf,

    /// Directory the chart PNGs are written to, created if absent.
    /// Default: "outputs_charts"
    pub charts_dir: PathBuf,

    /// Whether to render charts at all.
    /// Default: true
    pub render_charts: bool,

    /// How many customers the top-spenders ranking lists.
    /// Default: 5
    pub top_customers: usize,

    /// How many categories the net-score ranking lists.
    /// Default: 3
    pub top_categories: usize,

    /// Number of equal-width bins in the order-value histogram.
    /// Default: 25
    pub histogram_bins: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            cleaned_csv_path: PathBuf::from(DEFAULT_CLEANED_CSV_PATH),
            charts_dir: PathBuf::from(DEFAULT_CHARTS_DIR),
            render_charts: true,
            top_customers: 5,
            top_categories: 3,
            histogram_bins: 25,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.input_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("input_path"));
        }

        if self.cleaned_csv_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("cleaned_csv_path"));
        }

        if self.charts_dir.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("charts_dir"));
        }

        if self.top_customers == 0 {
            return Err(ConfigValidationError::InvalidRankingSize {
                field: "top_customers",
                value: self.top_customers,
            });
        }

        if self.top_categories == 0 {
            return Err(ConfigValidationError::InvalidRankingSize {
                field: "top_categories",
                value: self.top_categories,
            });
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidHistogramBins(
                self.histogram_bins,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Path '{0}' must not be empty")]
    EmptyPath(&'static str),

    #[error("Invalid ranking size for '{field}': {value} (must be at least 1)")]
    InvalidRankingSize { field: &'static str, value: usize },

    #[error("Invalid histogram bin count: {0} (must be at least 1)")]
    InvalidHistogramBins(usize),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    input_path: Option<PathBuf>,
    cleaned_csv_path: Option<PathBuf>,
    charts_dir: Option<PathBuf>,
    render_charts: Option<bool>,
    top_customers: Option<usize>,
    top_categories: Option<usize>,
    histogram_bins: Option<usize>,
}

impl AnalysisConfigBuilder {
    /// Set the path of the input orders CSV.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the path the cleaned table snapshot is written to.
    pub fn cleaned_csv_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cleaned_csv_path = Some(path.into());
        self
    }

    /// Set the directory chart PNGs are written to.
    pub fn charts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.charts_dir = Some(path.into());
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Set how many customers the top-spenders ranking lists.
    pub fn top_customers(mut self, n: usize) -> Self {
        self.top_customers = Some(n);
        self
    }

    /// Set how many categories the net-score ranking lists.
    pub fn top_categories(mut self, n: usize) -> Self {
        self.top_categories = Some(n);
        self
    }

    /// Set the number of bins in the order-value histogram.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let config = AnalysisConfig {
            input_path: self
                .input_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_PATH)),
            cleaned_csv_path: self
                .cleaned_csv_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CLEANED_CSV_PATH)),
            charts_dir: self
                .charts_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHARTS_DIR)),
            render_charts: self.render_charts.unwrap_or(true),
            top_customers: self.top_customers.unwrap_or(5),
            top_categories: self.top_categories.unwrap_or(3),
            histogram_bins: self.histogram_bins.unwrap_or(25),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT_PATH));
        assert_eq!(config.top_customers, 5);
        assert_eq!(config.top_categories, 3);
        assert_eq!(config.histogram_bins, 25);
        assert!(config.render_charts);
    }

    #[test]
    fn test_builder_defaults() {
        let config = AnalysisConfig::builder().build().unwrap();
        assert_eq!(config.cleaned_csv_path, PathBuf::from(DEFAULT_CLEANED_CSV_PATH));
        assert_eq!(config.charts_dir, PathBuf::from(DEFAULT_CHARTS_DIR));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .input_path("orders.csv")
            .charts_dir("charts")
            .render_charts(false)
            .top_customers(10)
            .histogram_bins(50)
            .build()
            .unwrap();

        assert_eq!(config.input_path, PathBuf::from("orders.csv"));
        assert_eq!(config.charts_dir, PathBuf::from("charts"));
        assert!(!config.render_charts);
        assert_eq!(config.top_customers, 10);
        assert_eq!(config.histogram_bins, 50);
    }

    #[test]
    fn test_validation_zero_bins() {
        let result = AnalysisConfig::builder().histogram_bins(0).build();

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidHistogramBins(0)
        ));
    }

    #[test]
    fn test_validation_zero_ranking_size() {
        let result = AnalysisConfig::builder().top_customers(0).build();

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidRankingSize { .. }
        ));
    }

    #[test]
    fn test_validation_empty_path() {
        let result = AnalysisConfig::builder().input_path("").build();

        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyPath("input_path")
        ));
    }
}
