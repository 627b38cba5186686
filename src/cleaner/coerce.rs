//! Numeric coercion for the quantity and amount columns.

use crate::error::{AnalysisError, Result};
use crate::utils::{is_error_marker, is_numeric_dtype, parse_numeric_string};
use polars::prelude::*;

/// Coerce a series to Float64, turning anything unparseable into null.
///
/// Accepts currency symbols and thousands separators; error markers and empty
/// strings count as missing. Returns the coerced series together with the
/// number of non-null inputs that became null.
pub(crate) fn coerce_to_float(series: &Series) -> Result<(Series, usize)> {
    if is_numeric_dtype(series.dtype()) {
        return Ok((series.cast(&DataType::Float64)?, 0));
    }

    let str_series = series.str().map_err(|_| {
        AnalysisError::CleaningFailed(format!(
            "column '{}' has dtype {:?}, expected strings or numbers",
            series.name(),
            series.dtype()
        ))
    })?;
    let mut result_vec: Vec<Option<f64>> = Vec::with_capacity(str_series.len());
    let mut nulled = 0;

    for opt_val in str_series.into_iter() {
        match opt_val {
            Some(val) => {
                let trimmed = val.trim();

                if trimmed.is_empty() || is_error_marker(trimmed) {
                    nulled += 1;
                    result_vec.push(None);
                    continue;
                }

                match parse_numeric_string(trimmed) {
                    // "NaN" and "inf" parse in Rust; neither is a usable amount.
                    Some(float_val) if float_val.is_finite() => result_vec.push(Some(float_val)),
                    _ => {
                        nulled += 1;
                        result_vec.push(None);
                    }
                }
            }
            None => result_vec.push(None),
        }
    }

    Ok((Series::new(series.name().clone(), result_vec), nulled))
}

/// Repair a quantity series: coerce to numeric, truncate to integer, and
/// replace anything missing or non-positive with 1.
///
/// Returns the Int64 series together with the number of values replaced.
pub(crate) fn repair_quantity(series: &Series) -> Result<(Series, usize)> {
    let (floats, _) = coerce_to_float(series)?;
    let float_chunked = floats.f64()?;

    let mut result_vec: Vec<i64> = Vec::with_capacity(float_chunked.len());
    let mut repaired = 0;

    for opt_val in float_chunked.into_iter() {
        match opt_val {
            Some(val) => {
                // Truncate first so fractional quantities below 1 also repair.
                let int_val = val as i64;
                if int_val <= 0 {
                    repaired += 1;
                    result_vec.push(1);
                } else {
                    result_vec.push(int_val);
                }
            }
            None => {
                repaired += 1;
                result_vec.push(1);
            }
        }
    }

    Ok((Series::new(series.name().clone(), result_vec), repaired))
}
