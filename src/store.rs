//! Row store backing the TOIL engine.
//!
//! The engine only needs create, filtered listing with ordering, and per-row
//! conditional update, so the store is a trait with an in-process arena
//! implementation: entries live in a map keyed by id, with secondary indexes
//! by employee and by source interval. Ledger rows are never deleted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ToilError;
use crate::model::attendance::AttendanceInterval;
use crate::model::toil_entry::{HOURS_EPS, ToilEntry};

/// Insert payload for a ledger row; the store allocates the id.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub employee_id: u64,
    pub hours_earned: f64,
    pub earned_on: NaiveDate,
    pub expires_on: NaiveDate,
    pub source_interval_id: u64,
    pub note: String,
}

pub trait LedgerStore: Send + Sync {
    // Attendance rows.
    fn create_attendance(
        &self,
        employee_id: u64,
        date: NaiveDate,
        check_in: NaiveDateTime,
        weekend: bool,
        holiday: bool,
    ) -> Result<AttendanceInterval, ToilError>;
    fn attendance(&self, interval_id: u64) -> Option<AttendanceInterval>;
    /// Sets check-out on the employee's open interval for `date`. Fails with
    /// `NotCheckedIn` when there is no open interval, `InvalidInterval` when
    /// the check-out would not be after the check-in.
    fn finalize_attendance(
        &self,
        employee_id: u64,
        date: NaiveDate,
        check_out: NaiveDateTime,
    ) -> Result<AttendanceInterval, ToilError>;
    /// Records the derived fields computed by the TOIL pipeline.
    fn record_attendance_result(
        &self,
        interval_id: u64,
        working_hours: f64,
        overtime_hours: f64,
        toil_entry_id: Option<u64>,
    ) -> Result<(), ToilError>;

    // Ledger rows.
    /// Inserts a new credit row. Fails with `DuplicateSourceInterval` when a
    /// row for the same source interval already exists; the check and the
    /// insert are atomic under the store's write guard.
    fn insert_entry(&self, entry: NewEntry) -> Result<u64, ToilError>;
    fn entry(&self, entry_id: u64) -> Option<ToilEntry>;
    fn entries_for_employee(&self, employee_id: u64) -> Vec<ToilEntry>;
    /// Non-expired rows with remaining credit, ordered by expiry date
    /// ascending (id as tie-break). This ordering is load-bearing for
    /// consumption.
    fn active_entries(&self, employee_id: u64) -> Vec<ToilEntry>;
    fn entry_for_interval(&self, interval_id: u64) -> Option<ToilEntry>;
    /// Conditional update: grows `hours_used` by `hours` and returns the new
    /// remaining. The remaining-hours check and the mutation happen under
    /// one write guard, so concurrent deductions can never push remaining
    /// below zero.
    fn apply_usage(&self, entry_id: u64, hours: f64) -> Result<f64, ToilError>;
    /// Flips the expired flag on the given rows; already-expired rows are
    /// untouched. Returns how many rows actually transitioned.
    fn mark_expired(&self, entry_ids: &[u64]) -> usize;
    /// Ids of rows with `expired == false`, `expires_on <= now`, and
    /// remaining credit.
    fn expirable_entries(&self, now: NaiveDate) -> Vec<u64>;
}

#[derive(Default)]
struct StoreInner {
    attendance: HashMap<u64, AttendanceInterval>,
    attendance_by_day: HashMap<(u64, NaiveDate), u64>,
    entries: HashMap<u64, ToilEntry>,
    entries_by_employee: HashMap<u64, Vec<u64>>,
    // Uniqueness index enforcing one ledger entry per attendance interval.
    entry_by_interval: HashMap<u64, u64>,
}

/// In-process arena store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
    next_interval_id: AtomicU64,
    next_entry_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            next_interval_id: AtomicU64::new(1),
            next_entry_id: AtomicU64::new(1),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LedgerStore for MemoryStore {
    fn create_attendance(
        &self,
        employee_id: u64,
        date: NaiveDate,
        check_in: NaiveDateTime,
        weekend: bool,
        holiday: bool,
    ) -> Result<AttendanceInterval, ToilError> {
        let mut inner = self.write();
        if inner.attendance_by_day.contains_key(&(employee_id, date)) {
            return Err(ToilError::AlreadyCheckedIn);
        }
        let id = self.next_interval_id.fetch_add(1, Ordering::Relaxed);
        let interval = AttendanceInterval {
            id,
            employee_id,
            date,
            check_in,
            check_out: None,
            working_hours: None,
            overtime_hours: None,
            weekend,
            holiday,
            toil_entry_id: None,
        };
        inner.attendance_by_day.insert((employee_id, date), id);
        inner.attendance.insert(id, interval.clone());
        Ok(interval)
    }

    fn attendance(&self, interval_id: u64) -> Option<AttendanceInterval> {
        self.read().attendance.get(&interval_id).cloned()
    }

    fn finalize_attendance(
        &self,
        employee_id: u64,
        date: NaiveDate,
        check_out: NaiveDateTime,
    ) -> Result<AttendanceInterval, ToilError> {
        let mut inner = self.write();
        let id = *inner
            .attendance_by_day
            .get(&(employee_id, date))
            .ok_or(ToilError::NotCheckedIn)?;
        let interval = inner
            .attendance
            .get_mut(&id)
            .ok_or(ToilError::UnknownInterval(id))?;
        if interval.check_out.is_some() {
            return Err(ToilError::NotCheckedIn);
        }
        if check_out <= interval.check_in {
            return Err(ToilError::InvalidInterval);
        }
        interval.check_out = Some(check_out);
        Ok(interval.clone())
    }

    fn record_attendance_result(
        &self,
        interval_id: u64,
        working_hours: f64,
        overtime_hours: f64,
        toil_entry_id: Option<u64>,
    ) -> Result<(), ToilError> {
        let mut inner = self.write();
        let interval = inner
            .attendance
            .get_mut(&interval_id)
            .ok_or(ToilError::UnknownInterval(interval_id))?;
        interval.working_hours = Some(working_hours);
        interval.overtime_hours = Some(overtime_hours);
        interval.toil_entry_id = toil_entry_id;
        Ok(())
    }

    fn insert_entry(&self, entry: NewEntry) -> Result<u64, ToilError> {
        let mut inner = self.write();
        if inner
            .entry_by_interval
            .contains_key(&entry.source_interval_id)
        {
            return Err(ToilError::DuplicateSourceInterval(entry.source_interval_id));
        }
        let id = self.next_entry_id.fetch_add(1, Ordering::Relaxed);
        let row = ToilEntry {
            id,
            employee_id: entry.employee_id,
            hours_earned: entry.hours_earned,
            hours_used: 0.0,
            earned_on: entry.earned_on,
            expires_on: entry.expires_on,
            expired: false,
            source_interval_id: entry.source_interval_id,
            note: entry.note,
        };
        inner.entry_by_interval.insert(row.source_interval_id, id);
        inner
            .entries_by_employee
            .entry(row.employee_id)
            .or_default()
            .push(id);
        inner.entries.insert(id, row);
        Ok(id)
    }

    fn entry(&self, entry_id: u64) -> Option<ToilEntry> {
        self.read().entries.get(&entry_id).cloned()
    }

    fn entries_for_employee(&self, employee_id: u64) -> Vec<ToilEntry> {
        let inner = self.read();
        let mut rows: Vec<ToilEntry> = inner
            .entries_by_employee
            .get(&employee_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.entries.get(id).cloned())
            .collect();
        rows.sort_by_key(|e| (e.earned_on, e.id));
        rows
    }

    fn active_entries(&self, employee_id: u64) -> Vec<ToilEntry> {
        let mut rows: Vec<ToilEntry> = self
            .entries_for_employee(employee_id)
            .into_iter()
            .filter(ToilEntry::is_active)
            .collect();
        rows.sort_by_key(|e| (e.expires_on, e.id));
        rows
    }

    fn entry_for_interval(&self, interval_id: u64) -> Option<ToilEntry> {
        let inner = self.read();
        inner
            .entry_by_interval
            .get(&interval_id)
            .and_then(|id| inner.entries.get(id).cloned())
    }

    fn apply_usage(&self, entry_id: u64, hours: f64) -> Result<f64, ToilError> {
        let mut inner = self.write();
        let entry = inner
            .entries
            .get_mut(&entry_id)
            .ok_or(ToilError::UnknownEntry(entry_id))?;
        let remaining = entry.hours_remaining();
        if hours > remaining + HOURS_EPS {
            return Err(ToilError::OverDeduction {
                entry_id,
                hours,
                remaining,
            });
        }
        if (remaining - hours).abs() <= HOURS_EPS {
            // Full drain: pin used to earned so remaining is exactly zero.
            entry.hours_used = entry.hours_earned;
        } else {
            entry.hours_used += hours;
        }
        Ok(entry.hours_remaining())
    }

    fn mark_expired(&self, entry_ids: &[u64]) -> usize {
        let mut inner = self.write();
        let mut transitioned = 0;
        for id in entry_ids {
            if let Some(entry) = inner.entries.get_mut(id) {
                if !entry.expired {
                    entry.expired = true;
                    transitioned += 1;
                }
            }
        }
        transitioned
    }

    fn expirable_entries(&self, now: NaiveDate) -> Vec<u64> {
        let inner = self.read();
        let mut ids: Vec<u64> = inner
            .entries
            .values()
            .filter(|e| !e.expired && e.expires_on <= now && e.hours_remaining() > HOURS_EPS)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dt(date: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        date.and_hms_opt(h, min, 0).unwrap()
    }

    fn new_entry(employee_id: u64, hours: f64, interval_id: u64) -> NewEntry {
        NewEntry {
            employee_id,
            hours_earned: hours,
            earned_on: d(2026, 3, 2),
            expires_on: d(2026, 3, 23),
            source_interval_id: interval_id,
            note: String::new(),
        }
    }

    #[test]
    fn one_attendance_row_per_employee_per_day() {
        let store = MemoryStore::new();
        let day = d(2026, 3, 2);
        store
            .create_attendance(7, day, dt(day, 9, 0), false, false)
            .unwrap();
        let err = store
            .create_attendance(7, day, dt(day, 9, 5), false, false)
            .unwrap_err();
        assert_eq!(err, ToilError::AlreadyCheckedIn);
    }

    #[test]
    fn finalize_rejects_checkout_before_checkin() {
        let store = MemoryStore::new();
        let day = d(2026, 3, 2);
        store
            .create_attendance(7, day, dt(day, 9, 0), false, false)
            .unwrap();
        let err = store.finalize_attendance(7, day, dt(day, 9, 0)).unwrap_err();
        assert_eq!(err, ToilError::InvalidInterval);
        // The row is still open after the rejected finalize.
        let ok = store.finalize_attendance(7, day, dt(day, 17, 0)).unwrap();
        assert!(ok.is_finalized());
    }

    #[test]
    fn finalize_without_checkin_fails() {
        let store = MemoryStore::new();
        let day = d(2026, 3, 2);
        let err = store.finalize_attendance(7, day, dt(day, 17, 0)).unwrap_err();
        assert_eq!(err, ToilError::NotCheckedIn);
    }

    #[test]
    fn source_interval_uniqueness_is_enforced() {
        let store = MemoryStore::new();
        store.insert_entry(new_entry(7, 2.0, 41)).unwrap();
        let err = store.insert_entry(new_entry(7, 2.0, 41)).unwrap_err();
        assert_eq!(err, ToilError::DuplicateSourceInterval(41));
        assert_eq!(store.entries_for_employee(7).len(), 1);
    }

    #[test]
    fn active_entries_are_ordered_by_expiry() {
        let store = MemoryStore::new();
        let mut late = new_entry(7, 5.0, 1);
        late.expires_on = d(2026, 3, 30);
        let mut early = new_entry(7, 3.0, 2);
        early.expires_on = d(2026, 3, 22);
        let late_id = store.insert_entry(late).unwrap();
        let early_id = store.insert_entry(early).unwrap();
        let active = store.active_entries(7);
        assert_eq!(
            active.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![early_id, late_id]
        );
    }

    #[test]
    fn apply_usage_guards_against_over_deduction() {
        let store = MemoryStore::new();
        let id = store.insert_entry(new_entry(7, 2.5, 1)).unwrap();
        let err = store.apply_usage(id, 3.0).unwrap_err();
        assert!(matches!(err, ToilError::OverDeduction { .. }));
        // Failed deduction left the row untouched.
        assert_eq!(store.entry(id).unwrap().hours_used, 0.0);
        assert_eq!(store.apply_usage(id, 2.5).unwrap(), 0.0);
    }

    #[test]
    fn full_drain_leaves_exactly_zero_remaining() {
        let store = MemoryStore::new();
        let id = store.insert_entry(new_entry(7, 6.0, 1)).unwrap();
        store.apply_usage(id, 2.1).unwrap();
        let remaining = store.entry(id).unwrap().hours_remaining();
        let left = store.apply_usage(id, remaining).unwrap();
        assert_eq!(left, 0.0);
        assert!(store.active_entries(7).is_empty());
    }

    #[test]
    fn mark_expired_reports_only_transitions() {
        let store = MemoryStore::new();
        let a = store.insert_entry(new_entry(7, 1.0, 1)).unwrap();
        let b = store.insert_entry(new_entry(7, 1.0, 2)).unwrap();
        assert_eq!(store.mark_expired(&[a, b]), 2);
        assert_eq!(store.mark_expired(&[a, b]), 0);
    }
}
