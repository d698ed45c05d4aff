use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tolerance for hour comparisons. Hours are 2-decimal quantities, so any
/// difference below this is float noise, not real credit.
pub const HOURS_EPS: f64 = 1e-9;

/// One unit of earned, expiring TOIL credit.
///
/// Entries are append-only: created once when an attendance interval is
/// classified as TOIL-eligible, mutated only by the consumption engine
/// (`hours_used` grows) and the expiry sweep (`expired` flips true), never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToilEntry {
    pub id: u64,
    pub employee_id: u64,
    pub hours_earned: f64,
    pub hours_used: f64,
    pub earned_on: NaiveDate,
    pub expires_on: NaiveDate,
    pub expired: bool,
    /// The attendance interval that produced this credit. Unique per entry.
    pub source_interval_id: u64,
    pub note: String,
}

impl ToilEntry {
    pub fn hours_remaining(&self) -> f64 {
        self.hours_earned - self.hours_used
    }

    /// Active entries are the ones consumption and balances operate on. A
    /// fully-drained entry is spent regardless of the expired flag.
    pub fn is_active(&self) -> bool {
        !self.expired && self.hours_remaining() > HOURS_EPS
    }
}
