//! Balance aggregation over active ledger entries.

use chrono::{Duration, NaiveDate};

use crate::engine::ledger::ToilLedger;
use crate::engine::time::round_hours;
use crate::model::balance::BalanceSummary;

#[derive(Clone)]
pub struct BalanceAggregator {
    ledger: ToilLedger,
}

impl BalanceAggregator {
    pub fn new(ledger: ToilLedger) -> Self {
        Self { ledger }
    }

    /// Total available hours plus the subset expiring within the warning
    /// horizon. Entries whose expiry has already passed but which the sweep
    /// has not retired yet still count toward the total, but are excluded
    /// from "expiring soon" (they are effectively already void).
    pub fn balance(
        &self,
        employee_id: u64,
        now: NaiveDate,
        warning_horizon_days: i64,
    ) -> BalanceSummary {
        let entries = self.ledger.list_active_entries(employee_id);
        let horizon_end = now + Duration::days(warning_horizon_days);

        let total: f64 = entries.iter().map(|e| e.hours_remaining()).sum();
        let mut expiring = 0.0;
        let mut expiring_on: Option<NaiveDate> = None;
        for entry in &entries {
            if entry.expires_on > now && entry.expires_on <= horizon_end {
                expiring += entry.hours_remaining();
                expiring_on = match expiring_on {
                    Some(date) if date <= entry.expires_on => Some(date),
                    _ => Some(entry.expires_on),
                };
            }
        }

        // Sums keep full precision above; rounding happens only here, at the
        // presentation boundary.
        BalanceSummary {
            total_hours: round_hours(total),
            expiring_hours: round_hours(expiring),
            expiring_on,
        }
    }
}
