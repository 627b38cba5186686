//! Aggregation stage of the order analysis pipeline.
//!
//! Runs after cleaning and reduces the table to every number the report and
//! the charts need:
//!
//! - Descriptive stats of the order value column
//! - Sales totals and averages by category, region and payment method
//! - Customer ranking and delivery outcome counts
//! - Monthly sales trend and region-by-status contingency counts
//! - Per-category net score and per-region delivery success rate

pub mod grouping;
pub mod overview;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::types::{
    CANCELLED_MATCH, CATEGORY, CUSTOMER_NAME, DELIVERED_MATCH, DELIVERY_STATUS, PAYMENT_METHOD,
    QUANTITY, REGION, RETURNED_MATCH, TOTAL_AMOUNT,
};
use crate::utils::string_mode;
use polars::prelude::*;
use tracing::{debug, info};

pub use grouping::CrosstabCounts;
pub use overview::summarize_dataset;

/// Every aggregate the report and chart stages consume.
///
/// Ranked lists are sorted by value descending with alphabetical tie-breaks,
/// except where noted.
#[derive(Debug, Clone)]
pub struct OrderAggregates {
    /// Total revenue over all orders with a usable amount.
    pub total_revenue: f64,
    /// Mean order value, `None` when no amount survived cleaning.
    pub avg_order_value: Option<f64>,
    /// Smallest order value.
    pub min_order_value: Option<f64>,
    /// Largest order value.
    pub max_order_value: Option<f64>,
    /// Mean units per order.
    pub avg_quantity: Option<f64>,
    /// Revenue per category, every category included.
    pub category_sales: Vec<(String, f64)>,
    /// Revenue per region.
    pub region_sales: Vec<(String, f64)>,
    /// Mean order value per category.
    pub category_avg_order: Vec<(String, f64)>,
    /// Mean order value per payment method.
    pub payment_avg_order: Vec<(String, f64)>,
    /// Order count per payment method.
    pub payment_counts: Vec<(String, usize)>,
    /// Most frequent payment method.
    pub top_payment_method: Option<String>,
    /// Highest-spending customers, at most `top_customers` entries.
    pub top_customers: Vec<(String, f64)>,
    /// Orders whose status reads as delivered.
    pub delivered_orders: usize,
    /// Orders whose status reads as cancelled or returned.
    pub cancelled_or_returned: usize,
    /// Every usable order value, histogram input.
    pub order_values: Vec<f64>,
    /// Revenue per calendar month, ascending by month.
    pub monthly_sales: Vec<(String, f64)>,
    /// Region-by-delivery-status contingency counts.
    pub status_by_region: CrosstabCounts,
    /// Best categories by net score, at most `top_categories` entries.
    pub category_net_scores: Vec<(String, f64)>,
    /// Delivered-to-total ratio per region, regions ascending.
    pub region_delivery_rates: Vec<(String, f64)>,
    /// Regions whose delivery rate sits below the mean rate.
    pub regions_below_mean_rate: Vec<String>,
}

/// Reduces a cleaned order table to [`OrderAggregates`].
pub struct OrderAnalyzer;

impl OrderAnalyzer {
    /// Compute every aggregate over a cleaned table.
    ///
    /// Expects the cleaner to have run already: quantities integral and
    /// positive, categorical nulls filled. Null order amounts are tolerated
    /// and excluded from sums and means.
    pub fn analyze(&self, df: &DataFrame, config: &AnalysisConfig) -> Result<OrderAggregates> {
        info!("Aggregating {} cleaned orders", df.height());

        let order_values: Vec<f64> = grouping::float_column(df, TOTAL_AMOUNT)?
            .into_iter()
            .flatten()
            .collect();
        let total_revenue: f64 = order_values.iter().sum();
        let avg_order_value = mean_of(&order_values);
        let min_order_value = order_values.iter().copied().reduce(f64::min);
        let max_order_value = order_values.iter().copied().reduce(f64::max);

        let quantities: Vec<f64> = grouping::float_column(df, QUANTITY)?
            .into_iter()
            .flatten()
            .collect();
        let avg_quantity = mean_of(&quantities);

        let category_sales = grouping::group_sum(df, CATEGORY, TOTAL_AMOUNT)?;
        let region_sales = grouping::group_sum(df, REGION, TOTAL_AMOUNT)?;
        let category_avg_order = grouping::group_mean(df, CATEGORY, TOTAL_AMOUNT)?;
        let payment_avg_order = grouping::group_mean(df, PAYMENT_METHOD, TOTAL_AMOUNT)?;
        let payment_counts = grouping::value_counts_desc(df, PAYMENT_METHOD)?;
        let top_payment_method = string_mode(df.column(PAYMENT_METHOD)?.as_materialized_series());

        let mut top_customers = grouping::group_sum(df, CUSTOMER_NAME, TOTAL_AMOUNT)?;
        top_customers.truncate(config.top_customers);

        let delivered_orders = grouping::count_matching(df, DELIVERY_STATUS, &[DELIVERED_MATCH])?;
        let cancelled_or_returned =
            grouping::count_matching(df, DELIVERY_STATUS, &[CANCELLED_MATCH, RETURNED_MATCH])?;

        let dates = overview::parse_order_dates(df)?;
        let monthly_sales = grouping::monthly_sales(df, &dates)?;

        let status_by_region = grouping::crosstab_counts(df, REGION, DELIVERY_STATUS)?;

        let mut category_net_scores = grouping::category_net_scores(df)?;
        category_net_scores.truncate(config.top_categories);

        let region_delivery_rates = grouping::delivery_success_rates(df)?;
        let regions_below_mean_rate = grouping::regions_below_mean(&region_delivery_rates);

        debug!(
            categories = category_sales.len(),
            regions = region_sales.len(),
            months = monthly_sales.len(),
            "Aggregation finished"
        );

        Ok(OrderAggregates {
            total_revenue,
            avg_order_value,
            min_order_value,
            max_order_value,
            avg_quantity,
            category_sales,
            region_sales,
            category_avg_order,
            payment_avg_order,
            payment_counts,
            top_payment_method,
            top_customers,
            delivered_orders,
            cancelled_or_returned,
            order_values,
            monthly_sales,
            status_by_region,
            category_net_scores,
            region_delivery_rates,
            regions_below_mean_rate,
        })
    }
}

fn mean_of(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn cleaned_frame() -> DataFrame {
        df!(
            crate::types::ORDER_DATE => &[
                "2024-01-05", "2024-01-20", "2024-02-02", "2024-02-14",
            ],
            CATEGORY => &["Electronics", "Electronics", "Clothing", "Toys"],
            REGION => &["North", "South", "North", "South"],
            CUSTOMER_NAME => &["Ana", "Ben", "Ana", "Cleo"],
            PAYMENT_METHOD => &["Card", "Cash", "Card", "Card"],
            DELIVERY_STATUS => &["Delivered", "Returned", "Delivered", "Cancelled"],
            QUANTITY => &[1i64, 2, 1, 4],
            TOTAL_AMOUNT => &[Some(100.0), Some(50.0), Some(30.0), None],
        )
        .unwrap()
    }

    fn analyze(df: &DataFrame) -> OrderAggregates {
        let config = AnalysisConfig::default();
        OrderAnalyzer.analyze(df, &config).unwrap()
    }

    #[test]
    fn test_analyze_descriptive_stats() {
        let aggregates = analyze(&cleaned_frame());

        assert_eq!(aggregates.total_revenue, 180.0);
        assert_eq!(aggregates.avg_order_value, Some(60.0));
        assert_eq!(aggregates.min_order_value, Some(30.0));
        assert_eq!(aggregates.max_order_value, Some(100.0));
        assert_eq!(aggregates.avg_quantity, Some(2.0));
    }

    #[test]
    fn test_analyze_category_sales_sum_to_total() {
        let aggregates = analyze(&cleaned_frame());

        let per_category: f64 = aggregates.category_sales.iter().map(|(_, v)| v).sum();
        assert!((per_category - aggregates.total_revenue).abs() < 1e-9);
        assert_eq!(aggregates.category_sales[0].0, "Electronics");
    }

    #[test]
    fn test_analyze_delivery_and_payment_aggregates() {
        let aggregates = analyze(&cleaned_frame());

        assert_eq!(aggregates.delivered_orders, 2);
        assert_eq!(aggregates.cancelled_or_returned, 2);
        assert_eq!(aggregates.top_payment_method, Some("Card".to_string()));
        assert_eq!(aggregates.payment_counts[0], ("Card".to_string(), 3));
    }

    #[test]
    fn test_analyze_net_scores_and_rates() {
        let aggregates = analyze(&cleaned_frame());

        // Electronics 100 delivered minus 50 returned, Clothing 30 delivered.
        assert_eq!(
            aggregates.category_net_scores[0],
            ("Electronics".to_string(), 50.0)
        );
        assert_eq!(
            aggregates.category_net_scores[1],
            ("Clothing".to_string(), 30.0)
        );

        // North delivered 2 of 2, South 0 of 2.
        assert_eq!(aggregates.region_delivery_rates[0], ("North".to_string(), 1.0));
        assert_eq!(aggregates.region_delivery_rates[1], ("South".to_string(), 0.0));
        assert_eq!(aggregates.regions_below_mean_rate, vec!["South".to_string()]);
    }

    #[test]
    fn test_analyze_monthly_trend_ascending() {
        let aggregates = analyze(&cleaned_frame());

        assert_eq!(aggregates.monthly_sales.len(), 2);
        assert_eq!(aggregates.monthly_sales[0], ("2024-01".to_string(), 150.0));
        assert_eq!(aggregates.monthly_sales[1], ("2024-02".to_string(), 30.0));
    }

    #[test]
    fn test_analyze_truncates_rankings() {
        let config = AnalysisConfig::builder()
            .top_customers(1)
            .top_categories(1)
            .build()
            .unwrap();
        let aggregates = OrderAnalyzer.analyze(&cleaned_frame(), &config).unwrap();

        assert_eq!(aggregates.top_customers.len(), 1);
        assert_eq!(aggregates.top_customers[0].0, "Ana");
        assert_eq!(aggregates.category_net_scores.len(), 1);
    }

    #[test]
    fn test_analyze_tolerates_all_null_amounts() {
        let df = df!(
            crate::types::ORDER_DATE => &["2024-01-05"],
            CATEGORY => &["Electronics"],
            REGION => &["North"],
            CUSTOMER_NAME => &["Ana"],
            PAYMENT_METHOD => &["Card"],
            DELIVERY_STATUS => &["Delivered"],
            QUANTITY => &[1i64],
            TOTAL_AMOUNT => &[None::<f64>],
        )
        .unwrap();

        let aggregates = analyze(&df);
        assert_eq!(aggregates.total_revenue, 0.0);
        assert_eq!(aggregates.avg_order_value, None);
        assert!(aggregates.order_values.is_empty());
        assert_eq!(aggregates.category_sales[0], ("Electronics".to_string(), 0.0));
    }
}
