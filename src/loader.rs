//! Loading of the orders CSV into a DataFrame.
//!
//! One read, no fallback strategies: a missing or unparsable file propagates
//! as an error. Schema inference scans the whole file so a column holding any
//! non-numeric value loads as String instead of failing the parse; typing the
//! quantity and amount columns is the cleaner's job.

use crate::error::{AnalysisError, Result, ResultExt};
use crate::types::REQUIRED_COLUMNS;
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

/// Load the orders table from a CSV file and validate its columns.
pub fn load_orders(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("While opening {}", path.display()))?
        .finish()
        .context(format!("While parsing {}", path.display()))?;

    ensure_required_columns(&df)?;
    debug!(
        rows = df.height(),
        columns = df.width(),
        "Loaded orders table from {}",
        path.display()
    );
    Ok(df)
}

/// Verify every required column is present, erroring on the first missing one.
pub fn ensure_required_columns(df: &DataFrame) -> Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for required in REQUIRED_COLUMNS {
        if !names.iter().any(|name| name == required) {
            return Err(AnalysisError::ColumnNotFound(required.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{QUANTITY, TOTAL_AMOUNT};
    use std::fs;

    const HEADER: &str =
        "OrderDate,Category,Region,CustomerName,PaymentMethod,DeliveryStatus,Quantity,TotalAmount ($)";

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, format!("{HEADER}\n{body}")).unwrap();
        path
    }

    #[test]
    fn test_load_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "orders.csv",
            "2024-01-05,Electronics,North,Alice,Card,Delivered,2,199.98\n\
             2024-01-06,Clothing,South,Bob,Cash,Pending,1,29.99",
        );

        let df = load_orders(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 8);
        assert_eq!(df.column(QUANTITY).unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_load_mixed_quantity_column_as_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "orders.csv",
            "2024-01-05,Electronics,North,Alice,Card,Delivered,2,199.98\n\
             2024-01-06,Clothing,South,Bob,Cash,Pending,abc,29.99",
        );

        // Full-file inference must fall back to String rather than erroring.
        let df = load_orders(&path).unwrap();
        assert_eq!(df.column(QUANTITY).unwrap().dtype(), &DataType::String);
        assert_eq!(df.column(TOTAL_AMOUNT).unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = load_orders(Path::new("does/not/exist.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_missing_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.csv");
        fs::write(
            &path,
            "OrderDate,Category,Region,CustomerName,PaymentMethod,DeliveryStatus,Quantity\n\
             2024-01-05,Electronics,North,Alice,Card,Delivered,2",
        )
        .unwrap();

        let result = load_orders(&path);
        match result {
            Err(AnalysisError::ColumnNotFound(column)) => {
                assert_eq!(column, TOTAL_AMOUNT);
            }
            other => panic!("expected ColumnNotFound, got {other:?}"),
        }
    }
}
