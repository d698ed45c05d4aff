//! Ledger entry operations over the store.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::info;

use crate::error::ToilError;
use crate::model::toil_entry::ToilEntry;
use crate::store::{LedgerStore, NewEntry};

#[derive(Clone)]
pub struct ToilLedger {
    store: Arc<dyn LedgerStore>,
    expiry_days: i64,
}

impl ToilLedger {
    pub fn new(store: Arc<dyn LedgerStore>, expiry_days: i64) -> Self {
        Self { store, expiry_days }
    }

    /// Creates one credit entry. The expiry date is derived here: earned
    /// date plus the policy's expiry window (21 days by default).
    pub fn create_entry(
        &self,
        employee_id: u64,
        hours_earned: f64,
        earned_on: NaiveDate,
        source_interval_id: u64,
        note: String,
    ) -> Result<u64, ToilError> {
        if hours_earned <= 0.0 {
            return Err(ToilError::InvalidAmount(hours_earned));
        }
        let expires_on = earned_on + Duration::days(self.expiry_days);
        let entry_id = self.store.insert_entry(NewEntry {
            employee_id,
            hours_earned,
            earned_on,
            expires_on,
            source_interval_id,
            note,
        })?;
        info!(
            employee_id,
            entry_id,
            hours_earned,
            %expires_on,
            "TOIL credit recorded"
        );
        Ok(entry_id)
    }

    /// Entries with remaining credit, oldest-expiring first. Consumption
    /// relies on this ordering.
    pub fn list_active_entries(&self, employee_id: u64) -> Vec<ToilEntry> {
        self.store.active_entries(employee_id)
    }

    pub fn list_entries(&self, employee_id: u64) -> Vec<ToilEntry> {
        self.store.entries_for_employee(employee_id)
    }

    pub fn entry_for_interval(&self, interval_id: u64) -> Option<ToilEntry> {
        self.store.entry_for_interval(interval_id)
    }

    pub fn apply_usage(&self, entry_id: u64, hours: f64) -> Result<f64, ToilError> {
        self.store.apply_usage(entry_id, hours)
    }

    pub fn mark_expired(&self, entry_ids: &[u64]) -> usize {
        self.store.mark_expired(entry_ids)
    }

    pub fn expirable_entries(&self, now: NaiveDate) -> Vec<u64> {
        self.store.expirable_entries(now)
    }
}
