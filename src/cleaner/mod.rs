//! Cleaning of the loaded order table.
//!
//! The cleaner applies, in order:
//! - sentinel fill of missing payment method and delivery status
//! - quantity repair (coerce, truncate, missing or non-positive becomes 1)
//! - total-amount coercion (Float64, uncoercible values become null)
//! - exact-duplicate row removal, keeping the first occurrence
//!
//! Duplicates are dropped last so rows that only become identical through
//! repair are still caught, keeping the no-duplicates invariant unconditional.

mod coerce;

use crate::error::Result;
use crate::types::{
    CleaningSummary, DELIVERY_STATUS, PAYMENT_METHOD, QUANTITY, TOTAL_AMOUNT, UNKNOWN_SENTINEL,
};
use crate::utils::fill_string_nulls;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Cleaner for the raw order table.
pub struct OrderCleaner;

impl OrderCleaner {
    /// Clean the table and record what changed.
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, CleaningSummary)> {
        let mut summary = CleaningSummary::new(df.height());
        let mut df = df;

        info!("Cleaning order table ({} rows)...", df.height());

        // Null inventory before any mutation, for the report.
        summary.nulls_before = df
            .get_columns()
            .iter()
            .map(|col| (col.name().to_string(), col.null_count()))
            .collect();

        // 1. Sentinel-fill the two nullable categorical columns.
        summary.payment_filled = Self::fill_with_sentinel(&mut df, PAYMENT_METHOD)?;
        if summary.payment_filled > 0 {
            summary.add_action(format!(
                "Filled {} missing '{}' values with '{}'",
                summary.payment_filled, PAYMENT_METHOD, UNKNOWN_SENTINEL
            ));
        }

        summary.delivery_filled = Self::fill_with_sentinel(&mut df, DELIVERY_STATUS)?;
        if summary.delivery_filled > 0 {
            summary.add_action(format!(
                "Filled {} missing '{}' values with '{}'",
                summary.delivery_filled, DELIVERY_STATUS, UNKNOWN_SENTINEL
            ));
        }

        // 2. Repair the quantity column.
        let (quantities, repaired) =
            coerce::repair_quantity(df.column(QUANTITY)?.as_materialized_series())?;
        df.replace(QUANTITY, quantities)?;
        summary.quantities_repaired = repaired;
        if repaired > 0 {
            summary.add_action(format!(
                "Replaced {} missing, invalid, or non-positive '{}' values with 1",
                repaired, QUANTITY
            ));
        }

        // 3. Coerce the amount column, leaving failures as null.
        let (amounts, nulled) =
            coerce::coerce_to_float(df.column(TOTAL_AMOUNT)?.as_materialized_series())?;
        df.replace(TOTAL_AMOUNT, amounts)?;
        summary.amounts_uncoercible = nulled;
        if nulled > 0 {
            warn!("{} '{}' values failed coercion and stay missing", nulled, TOTAL_AMOUNT);
            summary.add_action(format!(
                "Set {} unparseable '{}' values to missing",
                nulled, TOTAL_AMOUNT
            ));
        }

        // 4. Drop exact-duplicate rows, keeping the first occurrence.
        let before_duplicates = df.height();
        df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        summary.duplicates_removed = before_duplicates - df.height();

        if summary.duplicates_removed > 0 {
            let pct = (summary.duplicates_removed as f64 / before_duplicates as f64) * 100.0;
            summary.add_action(format!(
                "Removed {} duplicate rows ({:.1}%)",
                summary.duplicates_removed, pct
            ));
            debug!("Removed {} duplicate rows", summary.duplicates_removed);
        } else {
            summary.add_action("No duplicate rows found".to_string());
            debug!("No duplicate rows found");
        }

        summary.rows_after = df.height();
        info!(
            "Cleaning complete: {} rows in, {} rows out",
            summary.rows_before, summary.rows_after
        );

        Ok((df, summary))
    }

    /// Fill nulls in a string column with the sentinel, returning the fill count.
    fn fill_with_sentinel(df: &mut DataFrame, column: &str) -> Result<usize> {
        let series = df.column(column)?.as_materialized_series();
        let missing = series.null_count();
        if missing == 0 {
            return Ok(0);
        }

        let filled = fill_string_nulls(series, UNKNOWN_SENTINEL)?;
        df.replace(column, filled)?;
        debug!("Filled {} nulls in '{}'", missing, column);
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CATEGORY, CUSTOMER_NAME, ORDER_DATE, REGION};
    use polars::df;

    fn dirty_frame() -> DataFrame {
        df!(
            ORDER_DATE => &["2024-01-05", "2024-01-06", "2024-01-06", "2024-02-01"],
            CATEGORY => &["Electronics", "Clothing", "Clothing", "Toys"],
            REGION => &["North", "South", "South", "East"],
            CUSTOMER_NAME => &["Alice", "Bob", "Bob", "Cara"],
            PAYMENT_METHOD => &[Some("Card"), None, None, Some("Cash")],
            DELIVERY_STATUS => &[Some("Delivered"), None, None, Some("Returned")],
            QUANTITY => &["2", "-1", "-1", "abc"],
            TOTAL_AMOUNT => &["199.98", "$25.00", "$25.00", "bad"],
        )
        .unwrap()
    }

    #[test]
    fn test_clean_fills_sentinel() {
        let (cleaned, summary) = OrderCleaner.clean(dirty_frame()).unwrap();

        assert_eq!(cleaned.column(PAYMENT_METHOD).unwrap().null_count(), 0);
        assert_eq!(cleaned.column(DELIVERY_STATUS).unwrap().null_count(), 0);
        assert_eq!(summary.payment_filled, 2);
        assert_eq!(summary.delivery_filled, 2);

        let methods = cleaned.column(PAYMENT_METHOD).unwrap();
        let methods = methods.as_materialized_series().str().unwrap().clone();
        assert_eq!(methods.get(1), Some(UNKNOWN_SENTINEL));
    }

    #[test]
    fn test_clean_removes_duplicates_keeping_first() {
        let (cleaned, summary) = OrderCleaner.clean(dirty_frame()).unwrap();

        // Rows 1 and 2 are identical, so one of them goes.
        assert_eq!(cleaned.height(), 3);
        assert_eq!(summary.duplicates_removed, 1);
        assert_eq!(summary.rows_before, 4);
        assert_eq!(summary.rows_after, 3);

        // Order preserved: Alice first, Cara last.
        let names = cleaned.column(CUSTOMER_NAME).unwrap();
        let names = names.as_materialized_series().str().unwrap().clone();
        assert_eq!(names.get(0), Some("Alice"));
        assert_eq!(names.get(2), Some("Cara"));
    }

    #[test]
    fn test_clean_repairs_quantities() {
        let (cleaned, summary) = OrderCleaner.clean(dirty_frame()).unwrap();

        let quantities = cleaned.column(QUANTITY).unwrap();
        assert_eq!(quantities.dtype(), &DataType::Int64);

        let values = quantities.as_materialized_series().i64().unwrap().clone();
        for opt in values.into_iter() {
            assert!(opt.unwrap() >= 1);
        }
        // -1 appears twice plus "abc"; one of the -1 rows later dedupes away.
        assert_eq!(summary.quantities_repaired, 3);
    }

    #[test]
    fn test_clean_coerces_amounts_preserving_nulls() {
        let (cleaned, summary) = OrderCleaner.clean(dirty_frame()).unwrap();

        let amounts = cleaned.column(TOTAL_AMOUNT).unwrap();
        assert_eq!(amounts.dtype(), &DataType::Float64);
        assert_eq!(summary.amounts_uncoercible, 1);

        let values = amounts.as_materialized_series().f64().unwrap().clone();
        assert_eq!(values.get(0), Some(199.98));
        assert_eq!(values.get(1), Some(25.0));
        assert_eq!(values.get(2), None);
    }

    #[test]
    fn test_clean_catches_duplicates_created_by_repair() {
        let frame = df!(
            ORDER_DATE => &["2024-01-05", "2024-01-05"],
            CATEGORY => &["Electronics", "Electronics"],
            REGION => &["North", "North"],
            CUSTOMER_NAME => &["Alice", "Alice"],
            PAYMENT_METHOD => &["Card", "Card"],
            DELIVERY_STATUS => &["Delivered", "Delivered"],
            QUANTITY => &["abc", "-2"],
            TOTAL_AMOUNT => &["10.0", "10.0"],
        )
        .unwrap();

        // Distinct raw rows collapse to the same row once both quantities
        // repair to 1; the invariant still has to hold.
        let (cleaned, summary) = OrderCleaner.clean(frame).unwrap();
        assert_eq!(cleaned.height(), 1);
        assert_eq!(summary.duplicates_removed, 1);
    }

    #[test]
    fn test_clean_records_null_inventory() {
        let (_, summary) = OrderCleaner.clean(dirty_frame()).unwrap();

        let payment_nulls = summary
            .nulls_before
            .iter()
            .find(|(name, _)| name == PAYMENT_METHOD)
            .map(|(_, count)| *count);
        assert_eq!(payment_nulls, Some(2));
        assert_eq!(summary.total_nulls_before(), 4);
    }

    #[test]
    fn test_clean_noop_on_spotless_table() {
        let frame = df!(
            ORDER_DATE => &["2024-01-05", "2024-01-06"],
            CATEGORY => &["Electronics", "Clothing"],
            REGION => &["North", "South"],
            CUSTOMER_NAME => &["Alice", "Bob"],
            PAYMENT_METHOD => &["Card", "Cash"],
            DELIVERY_STATUS => &["Delivered", "Pending"],
            QUANTITY => &[2i64, 1],
            TOTAL_AMOUNT => &[199.98f64, 29.99],
        )
        .unwrap();

        let (cleaned, summary) = OrderCleaner.clean(frame).unwrap();
        assert_eq!(cleaned.height(), 2);
        assert_eq!(summary.payment_filled, 0);
        assert_eq!(summary.quantities_repaired, 0);
        assert_eq!(summary.amounts_uncoercible, 0);
        assert_eq!(summary.duplicates_removed, 0);
    }
}
