//! Grouped reductions over the cleaned order table.
//!
//! All helpers iterate materialized columns and accumulate into maps; rows
//! with a null grouping key are skipped, null amounts are excluded from sums
//! and means but still count as rows.

use crate::error::Result;
use crate::types::{CATEGORY, DELIVERED_MATCH, DELIVERY_STATUS, REGION, RETURNED_MATCH, TOTAL_AMOUNT};
use crate::utils::{cmp_f64_desc, month_key};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Region-by-status contingency counts, both axes sorted ascending.
#[derive(Debug, Clone)]
pub struct CrosstabCounts {
    /// Row labels (e.g. regions).
    pub rows: Vec<String>,
    /// Column labels (e.g. delivery statuses).
    pub cols: Vec<String>,
    /// `counts[row][col]` cell counts.
    pub counts: Vec<Vec<u32>>,
}

impl CrosstabCounts {
    /// True when there is nothing to tabulate.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }

    /// Largest per-row total, the y-extent a stacked bar chart needs.
    pub fn max_row_total(&self) -> u32 {
        self.counts
            .iter()
            .map(|row| row.iter().sum::<u32>())
            .max()
            .unwrap_or(0)
    }
}

/// Grab a column as an owned string chunked array, casting if needed.
pub(crate) fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let series = df.column(name)?.as_materialized_series();
    let cast = series.cast(&DataType::String)?;
    Ok(cast.str()?.clone())
}

/// Grab a column as an owned Float64 chunked array, casting if needed.
pub(crate) fn float_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let series = df.column(name)?.as_materialized_series();
    let cast = series.cast(&DataType::Float64)?;
    Ok(cast.f64()?.clone())
}

/// Rank entries by value descending, alphabetically on ties.
fn sort_ranked(mut entries: Vec<(String, f64)>) -> Vec<(String, f64)> {
    entries.sort_by(|a, b| cmp_f64_desc(a.1, b.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

/// Sum of `value_col` grouped by `key_col`, ranked descending.
pub fn group_sum(df: &DataFrame, key_col: &str, value_col: &str) -> Result<Vec<(String, f64)>> {
    let keys = string_column(df, key_col)?;
    let values = float_column(df, value_col)?;

    let mut sums: HashMap<String, f64> = HashMap::new();
    for (opt_key, opt_val) in keys.into_iter().zip(values.into_iter()) {
        let Some(key) = opt_key else { continue };
        let entry = sums.entry(key.to_string()).or_insert(0.0);
        if let Some(val) = opt_val {
            *entry += val;
        }
    }

    Ok(sort_ranked(sums.into_iter().collect()))
}

/// Mean of `value_col` grouped by `key_col`, ranked descending.
///
/// A group whose every value is null gets NaN, which ranks last.
pub fn group_mean(df: &DataFrame, key_col: &str, value_col: &str) -> Result<Vec<(String, f64)>> {
    let keys = string_column(df, key_col)?;
    let values = float_column(df, value_col)?;

    let mut acc: HashMap<String, (f64, usize)> = HashMap::new();
    for (opt_key, opt_val) in keys.into_iter().zip(values.into_iter()) {
        let Some(key) = opt_key else { continue };
        let entry = acc.entry(key.to_string()).or_insert((0.0, 0));
        if let Some(val) = opt_val {
            entry.0 += val;
            entry.1 += 1;
        }
    }

    let means: Vec<(String, f64)> = acc
        .into_iter()
        .map(|(key, (sum, count))| {
            let mean = if count > 0 { sum / count as f64 } else { f64::NAN };
            (key, mean)
        })
        .collect();

    Ok(sort_ranked(means))
}

/// Row counts per distinct value of `column`, ranked by count descending and
/// alphabetically on ties.
pub fn value_counts_desc(df: &DataFrame, column: &str) -> Result<Vec<(String, usize)>> {
    let values = string_column(df, column)?;

    let mut counts: HashMap<String, usize> = HashMap::new();
    for val in values.into_iter().flatten() {
        *counts.entry(val.to_string()).or_insert(0) += 1;
    }

    let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(entries)
}

/// Count rows whose `column` value contains any of `needles`,
/// case-insensitively.
pub fn count_matching(df: &DataFrame, column: &str, needles: &[&str]) -> Result<usize> {
    let values = string_column(df, column)?;

    let mut count = 0;
    for val in values.into_iter().flatten() {
        let lower = val.to_lowercase();
        if needles.iter().any(|needle| lower.contains(needle)) {
            count += 1;
        }
    }
    Ok(count)
}

/// Delivered-to-total ratio per region, regions sorted ascending.
///
/// A region with no delivered orders reports 0.0, never NaN.
pub fn delivery_success_rates(df: &DataFrame) -> Result<Vec<(String, f64)>> {
    let regions = string_column(df, REGION)?;
    let statuses = string_column(df, DELIVERY_STATUS)?;

    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (opt_region, opt_status) in regions.into_iter().zip(statuses.into_iter()) {
        let Some(region) = opt_region else { continue };
        let entry = counts.entry(region.to_string()).or_insert((0, 0));
        entry.1 += 1;
        if let Some(status) = opt_status
            && status.to_lowercase().contains(DELIVERED_MATCH)
        {
            entry.0 += 1;
        }
    }

    let mut rates: Vec<(String, f64)> = counts
        .into_iter()
        .map(|(region, (delivered, total))| (region, delivered as f64 / total as f64))
        .collect();
    rates.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(rates)
}

/// Regions whose success rate sits strictly below the unweighted mean rate.
pub fn regions_below_mean(rates: &[(String, f64)]) -> Vec<String> {
    if rates.is_empty() {
        return Vec::new();
    }

    let mean = rates.iter().map(|(_, rate)| rate).sum::<f64>() / rates.len() as f64;
    rates
        .iter()
        .filter(|(_, rate)| *rate < mean)
        .map(|(region, _)| region.clone())
        .collect()
}

/// Contingency counts of `row_col` values against `col_col` values.
pub fn crosstab_counts(df: &DataFrame, row_col: &str, col_col: &str) -> Result<CrosstabCounts> {
    let row_vals = string_column(df, row_col)?;
    let col_vals = string_column(df, col_col)?;

    let mut cells: HashMap<(String, String), u32> = HashMap::new();
    let mut rows: BTreeSet<String> = BTreeSet::new();
    let mut cols: BTreeSet<String> = BTreeSet::new();

    for (opt_row, opt_col) in row_vals.into_iter().zip(col_vals.into_iter()) {
        let (Some(row), Some(col)) = (opt_row, opt_col) else {
            continue;
        };
        rows.insert(row.to_string());
        cols.insert(col.to_string());
        *cells
            .entry((row.to_string(), col.to_string()))
            .or_insert(0) += 1;
    }

    let rows: Vec<String> = rows.into_iter().collect();
    let cols: Vec<String> = cols.into_iter().collect();
    let counts = rows
        .iter()
        .map(|row| {
            cols.iter()
                .map(|col| {
                    cells
                        .get(&(row.clone(), col.clone()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    Ok(CrosstabCounts { rows, cols, counts })
}

/// Total order value per calendar month, ascending by month.
///
/// `dates` must be the parsed order dates of `df`, in row order.
pub fn monthly_sales(df: &DataFrame, dates: &[NaiveDate]) -> Result<Vec<(String, f64)>> {
    let amounts = float_column(df, TOTAL_AMOUNT)?;
    debug_assert_eq!(amounts.len(), dates.len());

    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for (date, opt_amount) in dates.iter().zip(amounts.into_iter()) {
        let entry = sums.entry(month_key(*date)).or_insert(0.0);
        if let Some(amount) = opt_amount {
            *entry += amount;
        }
    }

    Ok(sums.into_iter().collect())
}

/// Net score per category: non-returned order value minus returned order
/// value, ranked descending.
pub fn category_net_scores(df: &DataFrame) -> Result<Vec<(String, f64)>> {
    let categories = string_column(df, CATEGORY)?;
    let statuses = string_column(df, DELIVERY_STATUS)?;
    let amounts = float_column(df, TOTAL_AMOUNT)?;

    let mut scores: HashMap<String, f64> = HashMap::new();
    for ((opt_cat, opt_status), opt_amount) in categories
        .into_iter()
        .zip(statuses.into_iter())
        .zip(amounts.into_iter())
    {
        let Some(category) = opt_cat else { continue };
        let entry = scores.entry(category.to_string()).or_insert(0.0);
        let Some(amount) = opt_amount else { continue };

        let returned = opt_status
            .map(|status| status.to_lowercase().contains(RETURNED_MATCH))
            .unwrap_or(false);
        if returned {
            *entry -= amount;
        } else {
            *entry += amount;
        }
    }

    Ok(sort_ranked(scores.into_iter().collect()))
}
