//! TOIL consumption: all-or-nothing debits in ascending expiry order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::engine::ledger::ToilLedger;
use crate::error::ToilError;
use crate::model::toil_entry::HOURS_EPS;

// Per-employee serialization of the pre-flight-sum-then-deduct sequence.
// Two concurrent usage requests for the same employee must not interleave,
// or the balance check could be satisfied twice against the same credit.
static EMPLOYEE_LOCKS: Lazy<Mutex<HashMap<u64, Arc<Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn employee_lock(employee_id: u64) -> Arc<Mutex<()>> {
    EMPLOYEE_LOCKS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(employee_id)
        .or_default()
        .clone()
}

/// Outcome of a usage request. An insufficient balance is a business
/// outcome, not an error: `success` is false, nothing was deducted, and
/// `available_hours` tells the caller what the employee actually holds.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageOutcome {
    pub success: bool,
    pub hours_deducted: f64,
    pub available_hours: f64,
}

#[derive(Clone)]
pub struct ConsumptionEngine {
    ledger: ToilLedger,
}

impl ConsumptionEngine {
    pub fn new(ledger: ToilLedger) -> Self {
        Self { ledger }
    }

    /// Debits `hours` from the employee's active entries, draining the
    /// soonest-expiring entry first so the least credit is lost to expiry.
    /// Either the full amount is deducted or nothing is.
    pub fn use_hours(&self, employee_id: u64, hours: f64) -> Result<UsageOutcome, ToilError> {
        if hours <= 0.0 {
            return Err(ToilError::InvalidAmount(hours));
        }

        let lock = employee_lock(employee_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let entries = self.ledger.list_active_entries(employee_id);
        let available: f64 = entries.iter().map(|e| e.hours_remaining()).sum();
        if available + HOURS_EPS < hours {
            warn!(
                employee_id,
                requested = hours,
                available,
                "TOIL usage rejected: insufficient balance"
            );
            return Ok(UsageOutcome {
                success: false,
                hours_deducted: 0.0,
                available_hours: available,
            });
        }

        let mut still_needed = hours;
        for entry in &entries {
            if still_needed <= HOURS_EPS {
                break;
            }
            let take = still_needed.min(entry.hours_remaining());
            self.ledger.apply_usage(entry.id, take)?;
            still_needed -= take;
        }

        info!(employee_id, hours, "TOIL hours deducted");
        Ok(UsageOutcome {
            success: true,
            hours_deducted: hours,
            available_hours: available - hours,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;

    use crate::store::{LedgerStore, MemoryStore};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn setup() -> (Arc<MemoryStore>, ToilLedger, ConsumptionEngine) {
        let store = Arc::new(MemoryStore::new());
        let ledger = ToilLedger::new(store.clone(), 21);
        let engine = ConsumptionEngine::new(ledger.clone());
        (store, ledger, engine)
    }

    fn conservation_holds(store: &MemoryStore, employee_id: u64) {
        let entries = store.entries_for_employee(employee_id);
        let earned: f64 = entries.iter().map(|e| e.hours_earned).sum();
        let used: f64 = entries.iter().map(|e| e.hours_used).sum();
        let remaining: f64 = entries.iter().map(|e| e.hours_remaining()).sum();
        assert!((earned - used - remaining).abs() < HOURS_EPS);
        assert!(entries.iter().all(|e| e.hours_remaining() >= 0.0));
    }

    #[test]
    fn drains_soonest_expiring_entry_first() {
        let (store, ledger, engine) = setup();
        // A expires in 2 days with 3h, B in 10 days with 5h.
        let a = ledger
            .create_entry(7, 3.0, d(2026, 3, 1), 1, String::new())
            .unwrap();
        let b = ledger
            .create_entry(7, 5.0, d(2026, 3, 9), 2, String::new())
            .unwrap();

        let outcome = engine.use_hours(7, 4.0).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.hours_deducted, 4.0);

        assert_eq!(store.entry(a).unwrap().hours_remaining(), 0.0);
        assert_eq!(store.entry(b).unwrap().hours_remaining(), 4.0);
        conservation_holds(&store, 7);
    }

    #[test]
    fn insufficient_balance_deducts_nothing() {
        let (store, ledger, engine) = setup();
        ledger
            .create_entry(7, 3.0, d(2026, 3, 1), 1, String::new())
            .unwrap();
        ledger
            .create_entry(7, 2.0, d(2026, 3, 2), 2, String::new())
            .unwrap();

        let outcome = engine.use_hours(7, 6.0).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.hours_deducted, 0.0);
        assert_eq!(outcome.available_hours, 5.0);

        for entry in store.entries_for_employee(7) {
            assert_eq!(entry.hours_used, 0.0);
        }
    }

    #[test]
    fn non_positive_requests_are_errors() {
        let (_, _, engine) = setup();
        assert_eq!(
            engine.use_hours(7, 0.0).unwrap_err(),
            ToilError::InvalidAmount(0.0)
        );
        assert_eq!(
            engine.use_hours(7, -2.0).unwrap_err(),
            ToilError::InvalidAmount(-2.0)
        );
    }

    #[test]
    fn exact_drain_of_whole_balance_succeeds() {
        let (store, ledger, engine) = setup();
        ledger
            .create_entry(7, 1.25, d(2026, 3, 1), 1, String::new())
            .unwrap();
        ledger
            .create_entry(7, 2.75, d(2026, 3, 2), 2, String::new())
            .unwrap();

        let outcome = engine.use_hours(7, 4.0).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.available_hours, 0.0);
        assert!(store.active_entries(7).is_empty());
        conservation_holds(&store, 7);
    }

    #[test]
    fn repeated_fractional_usage_never_goes_negative() {
        let (store, ledger, engine) = setup();
        ledger
            .create_entry(7, 2.1, d(2026, 3, 1), 1, String::new())
            .unwrap();
        ledger
            .create_entry(7, 3.9, d(2026, 3, 5), 2, String::new())
            .unwrap();

        for _ in 0..5 {
            assert!(engine.use_hours(7, 1.2).unwrap().success);
            conservation_holds(&store, 7);
        }
        // 6.0 earned, 6.0 used: the next request must be refused.
        let outcome = engine.use_hours(7, 0.5).unwrap();
        assert!(!outcome.success);
        assert!(outcome.available_hours.abs() < HOURS_EPS);
    }

    #[test]
    fn expired_credit_is_not_spendable() {
        let (_, ledger, engine) = setup();
        let a = ledger
            .create_entry(7, 3.0, d(2026, 3, 1), 1, String::new())
            .unwrap();
        ledger.mark_expired(&[a]);
        let outcome = engine.use_hours(7, 1.0).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.available_hours, 0.0);
    }

    #[test]
    fn concurrent_usage_cannot_double_spend() {
        let (store, ledger, engine) = setup();
        ledger
            .create_entry(42, 4.0, d(2026, 3, 1), 1, String::new())
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = engine.clone();
            handles.push(std::thread::spawn(move || {
                engine.use_hours(42, 1.0).unwrap().success
            }));
        }
        let granted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        // 4h of credit, 1h requests: exactly four may win.
        assert_eq!(granted, 4);
        assert!(store.active_entries(42).is_empty());
        conservation_holds(&store, 42);
    }
}
