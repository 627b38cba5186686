//! Integration tests for the order analysis pipeline.
//!
//! These tests run the full load-clean-aggregate flow over CSV fixtures and
//! check the report data end to end. Chart rendering stays disabled so the
//! tests do not depend on system fonts.

use order_insights::types::{DELIVERY_STATUS, PAYMENT_METHOD, QUANTITY, TOTAL_AMOUNT};
use order_insights::{
    AnalysisConfig, AnalysisError, AnalysisPipeline, AnalysisReport, load_orders, render_report,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn run_fixture(filename: &str, dir: &Path) -> order_insights::Result<AnalysisReport> {
    let config = AnalysisConfig::builder()
        .input_path(fixtures_path().join(filename))
        .cleaned_csv_path(dir.join("cleaned.csv"))
        .charts_dir(dir.join("charts"))
        .render_charts(false)
        .build()
        .expect("Fixture config should validate");

    AnalysisPipeline::new(config).run()
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_overview_and_cleaning() {
    let dir = tempdir().unwrap();
    let report = run_fixture("orders_small.csv", dir.path()).expect("Pipeline should succeed");

    assert_eq!(report.overview.total_records, 12);
    assert_eq!(report.overview.unique_categories, 4);
    assert_eq!(report.overview.unique_regions, 4);
    let (earliest, latest) = report.overview.date_range.expect("Dates should parse");
    assert_eq!(earliest.to_string(), "2024-01-05");
    assert_eq!(latest.to_string(), "2024-03-28");

    let cleaning = &report.cleaning;
    assert_eq!(cleaning.rows_before, 12);
    assert_eq!(cleaning.rows_after, 11);
    assert_eq!(cleaning.duplicates_removed, 1);
    assert_eq!(cleaning.payment_filled, 1);
    assert_eq!(cleaning.delivery_filled, 1);
    assert_eq!(cleaning.quantities_repaired, 3);
    assert_eq!(cleaning.amounts_uncoercible, 1);
    assert!(!cleaning.actions.is_empty(), "Cleaning actions should be recorded");
}

#[test]
fn test_full_pipeline_aggregates() {
    let dir = tempdir().unwrap();
    let report = run_fixture("orders_small.csv", dir.path()).expect("Pipeline should succeed");
    let aggregates = &report.aggregates;

    assert!(approx_eq(aggregates.total_revenue, 1464.90));
    assert_eq!(aggregates.order_values.len(), 10);

    // Per-category sales must account for every dollar of revenue.
    let per_category: f64 = aggregates.category_sales.iter().map(|(_, v)| v).sum();
    assert!(approx_eq(per_category, aggregates.total_revenue));
    assert_eq!(aggregates.category_sales[0].0, "Electronics");
    assert!(approx_eq(aggregates.category_sales[0].1, 1090.0));

    assert_eq!(aggregates.delivered_orders, 5);
    assert_eq!(aggregates.cancelled_or_returned, 3);
    assert_eq!(aggregates.top_payment_method.as_deref(), Some("Credit Card"));
    assert_eq!(aggregates.payment_counts[0], ("Credit Card".to_string(), 4));

    assert_eq!(aggregates.top_customers.len(), 5);
    assert_eq!(aggregates.top_customers[0].0, "Alice Johnson");
    assert!(approx_eq(aggregates.top_customers[0].1, 560.0));

    let avg_quantity = aggregates.avg_quantity.expect("Quantities should exist");
    assert!(approx_eq(avg_quantity, 17.0 / 11.0));
}

#[test]
fn test_full_pipeline_monthly_trend() {
    let dir = tempdir().unwrap();
    let report = run_fixture("orders_small.csv", dir.path()).expect("Pipeline should succeed");
    let monthly = &report.aggregates.monthly_sales;

    assert_eq!(monthly.len(), 3);
    assert_eq!(monthly[0].0, "2024-01");
    assert_eq!(monthly[2].0, "2024-03");
    assert!(approx_eq(monthly[0].1, 450.5));
    assert!(approx_eq(monthly[1].1, 615.25));
    assert!(approx_eq(monthly[2].1, 599.15));
}

#[test]
fn test_full_pipeline_delivery_insights() {
    let dir = tempdir().unwrap();
    let report = run_fixture("orders_small.csv", dir.path()).expect("Pipeline should succeed");
    let aggregates = &report.aggregates;

    let rates = &aggregates.region_delivery_rates;
    assert_eq!(rates.len(), 4);
    assert_eq!(rates[0].0, "East");
    assert!(approx_eq(rates[0].1, 2.0 / 3.0));
    assert_eq!(rates[3].0, "West");
    assert!(approx_eq(rates[3].1, 0.0));

    assert_eq!(
        aggregates.regions_below_mean_rate,
        vec!["North".to_string(), "West".to_string()]
    );

    // Net score: Electronics 970 delivered-or-kept minus 120 returned.
    assert_eq!(aggregates.category_net_scores[0].0, "Electronics");
    assert!(approx_eq(aggregates.category_net_scores[0].1, 850.0));
}

// ============================================================================
// Cleaned Snapshot Tests
// ============================================================================

#[test]
fn test_cleaned_snapshot_upholds_invariants() {
    let dir = tempdir().unwrap();
    let report = run_fixture("orders_small.csv", dir.path()).expect("Pipeline should succeed");

    let reloaded = load_orders(&report.cleaned_csv_path).expect("Snapshot should reload");
    assert_eq!(reloaded.height(), 11);

    // No categorical nulls survive cleaning.
    assert_eq!(reloaded.column(PAYMENT_METHOD).unwrap().null_count(), 0);
    assert_eq!(reloaded.column(DELIVERY_STATUS).unwrap().null_count(), 0);

    // Quantities are integral and at least 1.
    let quantities = reloaded
        .column(QUANTITY)
        .unwrap()
        .as_materialized_series()
        .i64()
        .expect("Quantity should reload as integers")
        .clone();
    assert!(quantities.into_iter().flatten().all(|quantity| quantity >= 1));

    // The one uncoercible amount stays missing rather than invented.
    assert_eq!(reloaded.column(TOTAL_AMOUNT).unwrap().null_count(), 1);

    // No two identical rows survive cleaning.
    let deduped = reloaded
        .unique_stable(None, UniqueKeepStrategy::First, None)
        .expect("Unique should succeed");
    assert_eq!(deduped.height(), reloaded.height());
}

#[test]
fn test_cleaned_snapshot_has_exact_header() {
    let dir = tempdir().unwrap();
    let report = run_fixture("orders_small.csv", dir.path()).expect("Pipeline should succeed");

    let written = std::fs::read_to_string(&report.cleaned_csv_path).unwrap();
    let header = written.lines().next().expect("Snapshot should have a header");
    assert_eq!(
        header,
        "OrderDate,Category,Region,CustomerName,PaymentMethod,DeliveryStatus,Quantity,TotalAmount ($)"
    );
}

// ============================================================================
// Reference Fixture Tests
// ============================================================================

#[test]
fn test_net_score_reference_fixture() {
    let dir = tempdir().unwrap();
    let report = run_fixture("net_score.csv", dir.path()).expect("Pipeline should succeed");
    let scores = &report.aggregates.category_net_scores;

    assert_eq!(scores[0], ("Electronics".to_string(), 50.0));
    assert_eq!(scores[1], ("Clothing".to_string(), 30.0));
}

#[test]
fn test_delivery_rate_reference_fixture() {
    let dir = tempdir().unwrap();
    let report = run_fixture("delivery_rate.csv", dir.path()).expect("Pipeline should succeed");
    let rates = &report.aggregates.region_delivery_rates;

    assert_eq!(rates.len(), 1);
    assert_eq!(rates[0].0, "North");
    assert!(approx_eq(rates[0].1, 0.5));
}

// ============================================================================
// Failure Mode Tests
// ============================================================================

#[test]
fn test_missing_required_column_fails() {
    let dir = tempdir().unwrap();
    let err = run_fixture("missing_column.csv", dir.path())
        .expect_err("Pipeline should reject an incomplete schema");

    match err {
        AnalysisError::ColumnNotFound(column) => assert_eq!(column, TOTAL_AMOUNT),
        other => panic!("Expected ColumnNotFound, got: {other:?}"),
    }
}

#[test]
fn test_missing_input_file_fails() {
    let dir = tempdir().unwrap();
    let err = run_fixture("does_not_exist.csv", dir.path())
        .expect_err("Pipeline should fail on a missing input file");

    // Whatever the underlying error, the path must not silently succeed.
    let message = err.to_string();
    assert!(!message.is_empty());
}

// ============================================================================
// Report Rendering Tests
// ============================================================================

#[test]
fn test_report_renders_over_real_run() {
    let dir = tempdir().unwrap();
    let report = run_fixture("orders_small.csv", dir.path()).expect("Pipeline should succeed");

    let mut buf = Vec::new();
    render_report(&mut buf, &report).expect("Report should render");
    let text = String::from_utf8(buf).expect("Report should be valid UTF-8");

    assert!(text.contains("1. DATA UNDERSTANDING"));
    assert!(text.contains("6. BUSINESS INSIGHTS"));
    assert!(text.contains("Total revenue: $1,464.90"));
    assert!(text.contains("Review fulfilment in North, West"));
    assert!(text.contains("Chart rendering was disabled"));
}
