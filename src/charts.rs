//! Chart rendering for the order analysis pipeline.
//!
//! Writes five PNGs into the charts directory, creating it when absent:
//!
//! | File                              | Chart                        |
//! |-----------------------------------|------------------------------|
//! | `total_sales_per_category.png`    | Bar, revenue per category    |
//! | `payment_method_distribution.png` | Pie, orders per method       |
//! | `hist_total_amount.png`           | Histogram of order values    |
//! | `monthly_sales_trend.png`         | Line, revenue per month      |
//! | `delivery_status_by_region.png`   | Stacked bar, status counts   |

use crate::analysis::{CrosstabCounts, OrderAggregates};
use crate::error::{AnalysisError, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Pixel size of every rendered chart.
pub const CHART_SIZE: (u32, u32) = (1000, 600);

/// Bar chart of revenue per category.
pub const CATEGORY_SALES_FILE: &str = "total_sales_per_category.png";
/// Pie chart of order counts per payment method.
pub const PAYMENT_DISTRIBUTION_FILE: &str = "payment_method_distribution.png";
/// Histogram of order values.
pub const AMOUNT_HISTOGRAM_FILE: &str = "hist_total_amount.png";
/// Line chart of revenue per month.
pub const MONTHLY_TREND_FILE: &str = "monthly_sales_trend.png";
/// Stacked bar chart of delivery status counts per region.
pub const STATUS_BY_REGION_FILE: &str = "delivery_status_by_region.png";

type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Render every chart into `dir`, creating the directory when missing.
///
/// Returns the written file paths in render order.
pub fn render_all(
    aggregates: &OrderAggregates,
    dir: &Path,
    histogram_bins: usize,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(5);

    let path = dir.join(CATEGORY_SALES_FILE);
    render_category_sales(&aggregates.category_sales, &path)?;
    written.push(path);

    let path = dir.join(PAYMENT_DISTRIBUTION_FILE);
    render_payment_distribution(&aggregates.payment_counts, &path)?;
    written.push(path);

    let path = dir.join(AMOUNT_HISTOGRAM_FILE);
    render_amount_histogram(&aggregates.order_values, histogram_bins, &path)?;
    written.push(path);

    let path = dir.join(MONTHLY_TREND_FILE);
    render_monthly_trend(&aggregates.monthly_sales, &path)?;
    written.push(path);

    let path = dir.join(STATUS_BY_REGION_FILE);
    render_status_by_region(&aggregates.status_by_region, &path)?;
    written.push(path);

    for path in &written {
        info!("Wrote chart {}", path.display());
    }
    Ok(written)
}

/// Bar chart of total revenue per category, categories in ranked order.
pub fn render_category_sales(categories: &[(String, f64)], path: &Path) -> Result<()> {
    draw_category_sales(categories, path)
        .map_err(|e| chart_error(CATEGORY_SALES_FILE, e))
}

/// Pie chart of order counts per payment method.
pub fn render_payment_distribution(counts: &[(String, usize)], path: &Path) -> Result<()> {
    draw_payment_distribution(counts, path)
        .map_err(|e| chart_error(PAYMENT_DISTRIBUTION_FILE, e))
}

/// Histogram of order values over `bins` equal-width buckets.
pub fn render_amount_histogram(values: &[f64], bins: usize, path: &Path) -> Result<()> {
    draw_amount_histogram(values, bins, path)
        .map_err(|e| chart_error(AMOUNT_HISTOGRAM_FILE, e))
}

/// Line chart of revenue per month, months ascending.
pub fn render_monthly_trend(monthly: &[(String, f64)], path: &Path) -> Result<()> {
    draw_monthly_trend(monthly, path).map_err(|e| chart_error(MONTHLY_TREND_FILE, e))
}

/// Stacked bar chart of delivery status counts per region.
pub fn render_status_by_region(table: &CrosstabCounts, path: &Path) -> Result<()> {
    draw_status_by_region(table, path).map_err(|e| chart_error(STATUS_BY_REGION_FILE, e))
}

fn chart_error(chart: &str, source: Box<dyn std::error::Error>) -> AnalysisError {
    AnalysisError::ChartRenderFailed {
        chart: chart.to_string(),
        reason: source.to_string(),
    }
}

/// Pick a stable color for the series at `idx`.
pub(crate) fn slice_color(idx: usize) -> RGBColor {
    let (r, g, b) = Palette99::COLORS[idx % Palette99::COLORS.len()];
    RGBColor(r, g, b)
}

fn draw_category_sales(categories: &[(String, f64)], path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let n = categories.len().max(1) as i32;
    let max_sales = categories
        .iter()
        .map(|(_, sales)| *sales)
        .fold(0.0f64, f64::max)
        .max(1.0)
        * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Total Sales per Category", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0i32..n, 0.0..max_sales)?;

    let labels: Vec<&str> = categories.iter().map(|(name, _)| name.as_str()).collect();
    chart
        .configure_mesh()
        .x_desc("Category")
        .y_desc("Total Sales ($)")
        .x_label_formatter(&|idx| {
            labels.get(*idx as usize).map(|s| s.to_string()).unwrap_or_default()
        })
        .y_label_formatter(&|v| format!("${v:.0}"))
        .draw()?;

    chart.draw_series(categories.iter().enumerate().map(|(idx, (_, sales))| {
        let mut bar = Rectangle::new(
            [(idx as i32, 0.0), (idx as i32 + 1, *sales)],
            BLUE.filled(),
        );
        bar.set_margin(0, 0, 4, 4);
        bar
    }))?;

    root.present()?;
    Ok(())
}

fn draw_payment_distribution(counts: &[(String, usize)], path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let child = root.titled("Payment Method Distribution", ("sans-serif", 30))?;

    if !counts.is_empty() {
        let (width, height) = child.dim_in_pixel();
        let center = (width as i32 / 2, height as i32 / 2);
        let radius = f64::from(width.min(height)) * 0.35;

        let sizes: Vec<f64> = counts.iter().map(|(_, count)| *count as f64).collect();
        let colors: Vec<RGBColor> = (0..counts.len()).map(slice_color).collect();
        let labels: Vec<String> = counts
            .iter()
            .map(|(method, count)| format!("{method} ({count})"))
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style(("sans-serif", 18).into_font());
        pie.percentages(("sans-serif", 14).into_font());
        child.draw(&pie)?;
    }

    root.present()?;
    Ok(())
}

fn draw_amount_histogram(values: &[f64], bins: usize, path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let binned = bin_amounts(values, bins);
    let (x_range, max_count) = match &binned {
        Some(b) => (
            b.start..b.start + b.width * b.counts.len() as f64,
            b.counts.iter().copied().max().unwrap_or(0),
        ),
        None => (0.0..1.0, 0),
    };
    let y_max = (max_count as f64).max(1.0) * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Distribution of Order Amounts", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Order Amount ($)")
        .y_desc("Orders")
        .draw()?;

    if let Some(b) = &binned {
        chart.draw_series(b.counts.iter().enumerate().map(|(idx, count)| {
            let x0 = b.start + b.width * idx as f64;
            let x1 = x0 + b.width;
            Rectangle::new([(x0, 0.0), (x1, *count as f64)], BLUE.mix(0.6).filled())
        }))?;
    }

    root.present()?;
    Ok(())
}

fn draw_monthly_trend(monthly: &[(String, f64)], path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let n = monthly.len().max(1) as i32;
    let max_sales = monthly
        .iter()
        .map(|(_, sales)| *sales)
        .fold(0.0f64, f64::max)
        .max(1.0)
        * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Monthly Sales Trend", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-1i32..n, 0.0..max_sales)?;

    let labels: Vec<&str> = monthly.iter().map(|(month, _)| month.as_str()).collect();
    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Total Sales ($)")
        .x_label_formatter(&|idx| {
            if *idx < 0 {
                return String::new();
            }
            labels.get(*idx as usize).map(|s| s.to_string()).unwrap_or_default()
        })
        .y_label_formatter(&|v| format!("${v:.0}"))
        .draw()?;

    let points: Vec<(i32, f64)> = monthly
        .iter()
        .enumerate()
        .map(|(idx, (_, sales))| (idx as i32, *sales))
        .collect();

    chart.draw_series(LineSeries::new(points.clone(), &BLUE))?;
    chart.draw_series(
        points
            .iter()
            .map(|(x, y)| Circle::new((*x, *y), 4, BLUE.filled())),
    )?;

    root.present()?;
    Ok(())
}

fn draw_status_by_region(table: &CrosstabCounts, path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let n = table.rows.len().max(1) as i32;
    let y_max = (f64::from(table.max_row_total())).max(1.0) * 1.15;

    let mut chart = ChartBuilder::on(&root)
        .caption("Delivery Status by Region", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0i32..n, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Region")
        .y_desc("Orders")
        .x_label_formatter(&|idx| {
            table
                .rows
                .get(*idx as usize)
                .cloned()
                .unwrap_or_default()
        })
        .draw()?;

    // One layer per status, stacked on the cumulative totals below it.
    let mut stacked_base = vec![0.0f64; table.rows.len()];
    for (status_idx, status) in table.cols.iter().enumerate() {
        let color = slice_color(status_idx);
        let layer: Vec<Rectangle<(i32, f64)>> = table
            .counts
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                let bottom = stacked_base[row_idx];
                let top = bottom + f64::from(row[status_idx]);
                stacked_base[row_idx] = top;
                let mut bar = Rectangle::new(
                    [(row_idx as i32, bottom), (row_idx as i32 + 1, top)],
                    color.filled(),
                );
                bar.set_margin(0, 0, 6, 6);
                bar
            })
            .collect();

        chart
            .draw_series(layer)?
            .label(status.clone())
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
            });
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .background_style(&WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Equal-width histogram buckets over `values`.
pub(crate) struct AmountBins {
    /// Count of values falling into each bucket.
    pub(crate) counts: Vec<usize>,
    /// Lower edge of the first bucket.
    pub(crate) start: f64,
    /// Width of every bucket, always positive.
    pub(crate) width: f64,
}

/// Bucket `values` into `bins` equal-width counts.
///
/// Returns `None` when there is nothing to bin. A degenerate span (all
/// values equal) falls back to a unit-wide bucket.
pub(crate) fn bin_amounts(values: &[f64], bins: usize) -> Option<AmountBins> {
    if values.is_empty() || bins == 0 {
        return None;
    }

    let start = values.iter().copied().reduce(f64::min)?;
    let end = values.iter().copied().reduce(f64::max)?;
    let span = end - start;
    let width = if span > 0.0 { span / bins as f64 } else { 1.0 };

    let mut counts = vec![0usize; bins];
    for value in values {
        let idx = ((value - start) / width) as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    Some(AmountBins {
        counts,
        start,
        width,
    })
}
