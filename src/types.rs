//! Shared types for the order analysis pipeline.
//!
//! This module defines the column vocabulary of the order table and the
//! summary structures the cleaning stage records for reporting.

use chrono::NaiveDate;

// =============================================================================
// Column Vocabulary
// =============================================================================

/// Order date column header.
pub const ORDER_DATE: &str = "OrderDate";
/// Product category column header.
pub const CATEGORY: &str = "Category";
/// Sales region column header.
pub const REGION: &str = "Region";
/// Customer display name column header.
pub const CUSTOMER_NAME: &str = "CustomerName";
/// Payment instrument column header.
pub const PAYMENT_METHOD: &str = "PaymentMethod";
/// Fulfilment status column header.
pub const DELIVERY_STATUS: &str = "DeliveryStatus";
/// Units-ordered column header.
pub const QUANTITY: &str = "Quantity";
/// Order value column header, dollars.
pub const TOTAL_AMOUNT: &str = "TotalAmount ($)";

/// Every column the input file must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    ORDER_DATE,
    CATEGORY,
    REGION,
    CUSTOMER_NAME,
    PAYMENT_METHOD,
    DELIVERY_STATUS,
    QUANTITY,
    TOTAL_AMOUNT,
];

/// Sentinel written into missing categorical fields.
pub const UNKNOWN_SENTINEL: &str = "Unknown";

/// Substring matched case-insensitively against delivery status for
/// cancelled orders.
pub const CANCELLED_MATCH: &str = "cancelled";
/// Substring matched case-insensitively against delivery status for
/// returned orders.
pub const RETURNED_MATCH: &str = "returned";
/// Substring matched case-insensitively against delivery status for
/// delivered orders. Deliberately a prefix so "Delivered", "delivery
/// confirmed" and similar variants all match.
pub const DELIVERED_MATCH: &str = "deliv";

// =============================================================================
// Stage Summaries
// =============================================================================

/// Shape and vocabulary of the loaded table, computed before cleaning.
#[derive(Debug, Clone)]
pub struct DatasetOverview {
    /// Number of data rows loaded.
    pub total_records: usize,
    /// Column names with their loaded dtypes, in table order.
    pub columns: Vec<(String, String)>,
    /// Distinct product categories.
    pub unique_categories: usize,
    /// Distinct sales regions.
    pub unique_regions: usize,
    /// Earliest and latest order date, `None` for an empty table.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

/// Counters the cleaning stage records for the report.
#[derive(Debug, Clone, Default)]
pub struct CleaningSummary {
    /// Row count entering the cleaner.
    pub rows_before: usize,
    /// Row count leaving the cleaner.
    pub rows_after: usize,
    /// Per-column null counts before any cleaning, in table order.
    pub nulls_before: Vec<(String, usize)>,
    /// Payment-method fields filled with the sentinel.
    pub payment_filled: usize,
    /// Delivery-status fields filled with the sentinel.
    pub delivery_filled: usize,
    /// Exact-duplicate rows dropped.
    pub duplicates_removed: usize,
    /// Quantity values replaced with 1 (missing, uncoercible, or non-positive).
    pub quantities_repaired: usize,
    /// Total-amount values nulled because they failed numeric coercion.
    pub amounts_uncoercible: usize,
    /// Human-readable description of each cleaning step applied.
    pub actions: Vec<String>,
}

impl CleaningSummary {
    /// Create a summary for a table entering the cleaner with `rows_before` rows.
    pub fn new(rows_before: usize) -> Self {
        Self {
            rows_before,
            rows_after: rows_before,
            ..Default::default()
        }
    }

    /// Record a cleaning action.
    pub fn add_action(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }

    /// Total rows removed by cleaning.
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Total nulls across all columns before cleaning.
    pub fn total_nulls_before(&self) -> usize {
        self.nulls_before.iter().map(|(_, count)| count).sum()
    }
}
