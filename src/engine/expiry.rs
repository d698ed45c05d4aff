//! Periodic retirement of lapsed credit.

use chrono::NaiveDate;
use tracing::info;

use crate::engine::ledger::ToilLedger;

#[derive(Clone)]
pub struct ExpirySweep {
    ledger: ToilLedger,
}

impl ExpirySweep {
    pub fn new(ledger: ToilLedger) -> Self {
        Self { ledger }
    }

    /// Flips the expired flag on every entry whose expiry date has passed
    /// and which still holds credit. Idempotent: repeat runs with the same
    /// `now` find nothing left to transition. Designed for a daily schedule
    /// but safe at any frequency, including concurrently with usage
    /// requests (the flag flip never touches remaining hours).
    pub fn run(&self, now: NaiveDate) -> usize {
        let ids = self.ledger.expirable_entries(now);
        if ids.is_empty() {
            return 0;
        }
        let transitioned = self.ledger.mark_expired(&ids);
        info!(%now, transitioned, "expiry sweep retired lapsed TOIL credit");
        transitioned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::store::{LedgerStore, MemoryStore};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn setup() -> (Arc<MemoryStore>, ToilLedger, ExpirySweep) {
        let store = Arc::new(MemoryStore::new());
        let ledger = ToilLedger::new(store.clone(), 21);
        let sweep = ExpirySweep::new(ledger.clone());
        (store, ledger, sweep)
    }

    #[test]
    fn retires_entries_past_their_expiry_date() {
        let (store, ledger, sweep) = setup();
        let lapsed = ledger
            .create_entry(7, 2.0, d(2026, 3, 1), 1, String::new())
            .unwrap(); // expires 03-22
        let live = ledger
            .create_entry(7, 3.0, d(2026, 3, 10), 2, String::new())
            .unwrap(); // expires 03-31

        assert_eq!(sweep.run(d(2026, 3, 22)), 1);
        assert!(store.entry(lapsed).unwrap().expired);
        assert!(!store.entry(live).unwrap().expired);
        // Remaining hours are untouched by the sweep.
        assert_eq!(store.entry(lapsed).unwrap().hours_remaining(), 2.0);
    }

    #[test]
    fn sweep_is_idempotent() {
        let (_, ledger, sweep) = setup();
        ledger
            .create_entry(7, 2.0, d(2026, 3, 1), 1, String::new())
            .unwrap();
        assert_eq!(sweep.run(d(2026, 4, 1)), 1);
        assert_eq!(sweep.run(d(2026, 4, 1)), 0);
        assert_eq!(sweep.run(d(2026, 4, 2)), 0);
    }

    #[test]
    fn day_before_expiry_is_not_swept() {
        let (_, ledger, sweep) = setup();
        ledger
            .create_entry(7, 2.0, d(2026, 3, 1), 1, String::new())
            .unwrap(); // expires 03-22
        assert_eq!(sweep.run(d(2026, 3, 21)), 0);
    }

    #[test]
    fn fully_consumed_entries_are_left_alone() {
        let (store, ledger, sweep) = setup();
        let id = ledger
            .create_entry(7, 2.0, d(2026, 3, 1), 1, String::new())
            .unwrap();
        ledger.apply_usage(id, 2.0).unwrap();
        assert_eq!(sweep.run(d(2026, 4, 1)), 0);
        assert!(!store.entry(id).unwrap().expired);
    }
}
