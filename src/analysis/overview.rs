//! First-look summary of the raw order table: shape, column types,
//! distinct category and region counts, and the order date range.

use crate::error::{AnalysisError, Result};
use crate::types::{CATEGORY, DatasetOverview, ORDER_DATE, REGION};
use crate::utils::parse_order_date;
use chrono::NaiveDate;
use polars::prelude::*;

/// Summarize a freshly loaded table, before any cleaning runs.
pub fn summarize_dataset(df: &DataFrame) -> Result<DatasetOverview> {
    let columns = df
        .get_columns()
        .iter()
        .map(|col| (col.name().to_string(), format!("{:?}", col.dtype())))
        .collect();

    let unique_categories = df
        .column(CATEGORY)?
        .as_materialized_series()
        .n_unique()?;
    let unique_regions = df.column(REGION)?.as_materialized_series().n_unique()?;

    let dates = parse_order_dates(df)?;
    let date_range = match (dates.iter().min(), dates.iter().max()) {
        (Some(&earliest), Some(&latest)) => Some((earliest, latest)),
        _ => None,
    };

    Ok(DatasetOverview {
        total_records: df.height(),
        columns,
        unique_categories,
        unique_regions,
        date_range,
    })
}

/// Parse every order date in row order.
///
/// A null or unrecognized value fails the whole run; order dates are the one
/// column the pipeline refuses to repair.
pub(crate) fn parse_order_dates(df: &DataFrame) -> Result<Vec<NaiveDate>> {
    let series = df.column(ORDER_DATE)?.as_materialized_series();
    let cast = series.cast(&DataType::String)?;
    let values = cast.str()?;

    let mut dates = Vec::with_capacity(values.len());
    for opt_val in values.into_iter() {
        let Some(val) = opt_val else {
            return Err(AnalysisError::InvalidOrderDate {
                column: ORDER_DATE.to_string(),
                value: "<null>".to_string(),
            });
        };
        match parse_order_date(val) {
            Some(date) => dates.push(date),
            None => {
                return Err(AnalysisError::InvalidOrderDate {
                    column: ORDER_DATE.to_string(),
                    value: val.to_string(),
                });
            }
        }
    }
    Ok(dates)
}
