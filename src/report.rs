//! Plain-text report over the finished pipeline run.
//!
//! Sections appear in a fixed order: data understanding, cleaning actions,
//! descriptive statistics, customer and product insights, chart confirmation,
//! business insights. Rendering only formats numbers the aggregation stage
//! already computed.

use crate::analysis::OrderAggregates;
use crate::error::Result;
use crate::types::{CleaningSummary, DatasetOverview};
use crate::utils::format_currency;
use std::io::Write;
use std::path::PathBuf;

/// Everything a pipeline run produced, ready to render.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Input file the orders were loaded from.
    pub input_path: PathBuf,
    /// Where the cleaned snapshot was written.
    pub cleaned_csv_path: PathBuf,
    /// Pre-cleaning shape and vocabulary of the table.
    pub overview: DatasetOverview,
    /// What the cleaner changed.
    pub cleaning: CleaningSummary,
    /// Every computed aggregate.
    pub aggregates: OrderAggregates,
    /// Chart files written, empty when rendering was disabled.
    pub chart_files: Vec<PathBuf>,
}

const BANNER_WIDTH: usize = 80;
const LABEL_WIDTH: usize = 28;

/// Render the full report to any writer.
pub fn render_report<W: Write>(out: &mut W, report: &AnalysisReport) -> Result<()> {
    write_understanding(out, report)?;
    write_cleaning(out, report)?;
    write_descriptive(out, &report.aggregates)?;
    write_insights(out, &report.aggregates)?;
    write_charts(out, &report.chart_files)?;
    write_business(out, &report.aggregates)?;
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(BANNER_WIDTH))?;
    Ok(())
}

fn section_header<W: Write>(out: &mut W, title: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(BANNER_WIDTH))?;
    writeln!(out, " {title}")?;
    writeln!(out, "{}", "=".repeat(BANNER_WIDTH))?;
    Ok(())
}

fn write_understanding<W: Write>(out: &mut W, report: &AnalysisReport) -> Result<()> {
    section_header(out, "1. DATA UNDERSTANDING")?;
    let overview = &report.overview;

    writeln!(out, "Source file: {}", report.input_path.display())?;
    writeln!(out, "Records loaded: {}", overview.total_records)?;
    writeln!(out, "Columns:")?;
    for (name, dtype) in &overview.columns {
        writeln!(out, "  - {name} ({dtype})")?;
    }
    writeln!(out, "Distinct categories: {}", overview.unique_categories)?;
    writeln!(out, "Distinct regions: {}", overview.unique_regions)?;
    match overview.date_range {
        Some((earliest, latest)) => {
            writeln!(out, "Order date range: {earliest} to {latest}")?;
        }
        None => writeln!(out, "Order date range: n/a")?,
    }

    writeln!(out, "Missing values before cleaning:")?;
    let mut any_missing = false;
    for (column, count) in &report.cleaning.nulls_before {
        if *count > 0 {
            writeln!(out, "  - {column}: {count}")?;
            any_missing = true;
        }
    }
    if !any_missing {
        writeln!(out, "  none")?;
    }
    Ok(())
}

fn write_cleaning<W: Write>(out: &mut W, report: &AnalysisReport) -> Result<()> {
    section_header(out, "2. DATA CLEANING")?;
    let cleaning = &report.cleaning;

    if cleaning.actions.is_empty() {
        writeln!(out, "No cleaning was necessary.")?;
    } else {
        for action in &cleaning.actions {
            writeln!(out, "  - {action}")?;
        }
    }
    writeln!(out, "Rows before cleaning: {}", cleaning.rows_before)?;
    writeln!(out, "Rows after cleaning: {}", cleaning.rows_after)?;
    writeln!(
        out,
        "Cleaned snapshot written to: {}",
        report.cleaned_csv_path.display()
    )?;
    Ok(())
}

fn write_descriptive<W: Write>(out: &mut W, aggregates: &OrderAggregates) -> Result<()> {
    section_header(out, "3. DESCRIPTIVE STATISTICS")?;

    writeln!(out, "Total revenue: {}", format_currency(aggregates.total_revenue))?;
    writeln!(
        out,
        "Average order value: {}",
        currency_or_na(aggregates.avg_order_value)
    )?;
    writeln!(
        out,
        "Smallest order value: {}",
        currency_or_na(aggregates.min_order_value)
    )?;
    writeln!(
        out,
        "Largest order value: {}",
        currency_or_na(aggregates.max_order_value)
    )?;
    match aggregates.avg_quantity {
        Some(avg) => writeln!(out, "Average units per order: {avg:.2}")?,
        None => writeln!(out, "Average units per order: n/a")?,
    }

    writeln!(out, "Sales by category:")?;
    write_ranked_currency(out, &aggregates.category_sales)?;
    writeln!(out, "Sales by region:")?;
    write_ranked_currency(out, &aggregates.region_sales)?;

    writeln!(out, "Orders by payment method:")?;
    for (rank, (method, count)) in aggregates.payment_counts.iter().enumerate() {
        writeln!(
            out,
            "  {:>2}. {:<width$} {count}",
            rank + 1,
            truncate_label(method),
            width = LABEL_WIDTH
        )?;
    }
    match &aggregates.top_payment_method {
        Some(method) => writeln!(out, "Most common payment method: {method}")?,
        None => writeln!(out, "Most common payment method: n/a")?,
    }

    writeln!(out, "Monthly sales:")?;
    for (month, sales) in &aggregates.monthly_sales {
        writeln!(out, "  {month}  {}", format_currency(*sales))?;
    }
    Ok(())
}

fn write_insights<W: Write>(out: &mut W, aggregates: &OrderAggregates) -> Result<()> {
    section_header(out, "4. CUSTOMER & PRODUCT INSIGHTS")?;

    writeln!(out, "Top customers by spend:")?;
    write_ranked_currency(out, &aggregates.top_customers)?;
    writeln!(out, "Average order value by category:")?;
    write_ranked_currency(out, &aggregates.category_avg_order)?;
    writeln!(out, "Average order value by payment method:")?;
    write_ranked_currency(out, &aggregates.payment_avg_order)?;

    writeln!(out, "Delivered orders: {}", aggregates.delivered_orders)?;
    writeln!(
        out,
        "Cancelled or returned orders: {}",
        aggregates.cancelled_or_returned
    )?;
    Ok(())
}

fn write_charts<W: Write>(out: &mut W, chart_files: &[PathBuf]) -> Result<()> {
    section_header(out, "5. CHARTS")?;

    if chart_files.is_empty() {
        writeln!(out, "Chart rendering was disabled for this run.")?;
    } else {
        writeln!(out, "Saved {} charts:", chart_files.len())?;
        for path in chart_files {
            writeln!(out, "  - {}", path.display())?;
        }
    }
    Ok(())
}

fn write_business<W: Write>(out: &mut W, aggregates: &OrderAggregates) -> Result<()> {
    section_header(out, "6. BUSINESS INSIGHTS")?;

    writeln!(out, "Top categories by net score:")?;
    write_ranked_currency(out, &aggregates.category_net_scores)?;

    match aggregates.payment_avg_order.first() {
        Some((method, avg)) => writeln!(
            out,
            "Highest average order value: {method} ({} per order)",
            format_currency(*avg)
        )?,
        None => writeln!(out, "Highest average order value: n/a")?,
    }

    writeln!(out, "Delivery success rate by region:")?;
    for (region, rate) in &aggregates.region_delivery_rates {
        writeln!(
            out,
            "  {:<width$} {:.1}%",
            truncate_label(region),
            rate * 100.0,
            width = LABEL_WIDTH
        )?;
    }

    writeln!(out, "Recommendations:")?;
    match aggregates.category_sales.first() {
        Some((category, total)) => writeln!(
            out,
            "  - Prioritize stock and promotion for {category}; it leads sales at {}.",
            format_currency(*total)
        )?,
        None => writeln!(out, "  - No category stands out yet; gather more order data.")?,
    }
    match aggregates.payment_avg_order.first() {
        Some((method, avg)) => writeln!(
            out,
            "  - Promote the {method} checkout flow; its average order is the largest at {}.",
            format_currency(*avg)
        )?,
        None => writeln!(out, "  - No payment method dominates yet.")?,
    }
    if aggregates.regions_below_mean_rate.is_empty() {
        writeln!(out, "  - Delivery rates are even across regions.")?;
    } else {
        writeln!(
            out,
            "  - Review fulfilment in {}; delivery rates there trail the average.",
            aggregates.regions_below_mean_rate.join(", ")
        )?;
    }
    Ok(())
}

fn write_ranked_currency<W: Write>(out: &mut W, entries: &[(String, f64)]) -> Result<()> {
    for (rank, (name, value)) in entries.iter().enumerate() {
        writeln!(
            out,
            "  {:>2}. {:<width$} {}",
            rank + 1,
            truncate_label(name),
            format_currency(*value),
            width = LABEL_WIDTH
        )?;
    }
    Ok(())
}

fn currency_or_na(value: Option<f64>) -> String {
    value.map(format_currency).unwrap_or_else(|| "n/a".to_string())
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() <= LABEL_WIDTH {
        return label.to_string();
    }
    let kept: String = label.chars().take(LABEL_WIDTH - 3).collect();
    format!("{kept}...")
}
