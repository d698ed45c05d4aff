use chrono::NaiveDate;
use serde::Serialize;

/// Derived balance view, never persisted. Hours are rounded to 2 decimals
/// here, at the presentation boundary; the aggregation itself keeps full
/// precision.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BalanceSummary {
    pub total_hours: f64,
    /// Remaining hours on entries expiring within the warning horizon.
    pub expiring_hours: f64,
    /// Earliest expiry among those entries, if any.
    pub expiring_on: Option<NaiveDate>,
}
