//! The engine facade: attendance intake plus the four TOIL operations the
//! surrounding service calls.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::config::ToilPolicy;
use crate::engine::balance::BalanceAggregator;
use crate::engine::consumption::{ConsumptionEngine, UsageOutcome};
use crate::engine::eligibility::{self, ToilReason};
use crate::engine::expiry::ExpirySweep;
use crate::engine::ledger::ToilLedger;
use crate::engine::time;
use crate::error::ToilError;
use crate::model::attendance::AttendanceInterval;
use crate::model::balance::BalanceSummary;
use crate::model::holiday::FixedHolidayCalendar;
use crate::model::toil_entry::ToilEntry;
use crate::store::LedgerStore;

/// What processing a finalized interval did to the ledger.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Credited {
        entry_id: u64,
        hours_earned: f64,
        reason: ToilReason,
    },
    NotEligible,
    AlreadyProcessed {
        entry_id: u64,
    },
}

pub struct ToilService {
    store: Arc<dyn LedgerStore>,
    calendar: Arc<FixedHolidayCalendar>,
    policy: ToilPolicy,
    ledger: ToilLedger,
    balance: BalanceAggregator,
    consumption: ConsumptionEngine,
    sweep: ExpirySweep,
}

impl ToilService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        calendar: Arc<FixedHolidayCalendar>,
        policy: ToilPolicy,
    ) -> Self {
        let ledger = ToilLedger::new(store.clone(), policy.expiry_days);
        Self {
            balance: BalanceAggregator::new(ledger.clone()),
            consumption: ConsumptionEngine::new(ledger.clone()),
            sweep: ExpirySweep::new(ledger.clone()),
            ledger,
            store,
            calendar,
            policy,
        }
    }

    pub fn calendar(&self) -> &FixedHolidayCalendar {
        &self.calendar
    }

    /// Opens today's interval for the employee. One interval per employee
    /// per calendar day.
    pub fn check_in(
        &self,
        employee_id: u64,
        at: NaiveDateTime,
    ) -> Result<AttendanceInterval, ToilError> {
        let date = at.date();
        let weekend = time::is_weekend(date, &self.policy.weekend_days);
        let holiday = time::is_holiday(date, self.calendar.as_ref());
        let interval = self
            .store
            .create_attendance(employee_id, date, at, weekend, holiday)?;
        info!(employee_id, %date, interval_id = interval.id, "checked in");
        Ok(interval)
    }

    /// Finalizes the open interval for the check-out day and runs the TOIL
    /// pipeline on it exactly once.
    pub fn check_out(
        &self,
        employee_id: u64,
        at: NaiveDateTime,
    ) -> Result<(AttendanceInterval, ProcessOutcome), ToilError> {
        let interval = self.store.finalize_attendance(employee_id, at.date(), at)?;
        info!(employee_id, interval_id = interval.id, "checked out");
        let outcome = self.process_attendance_for_toil(interval.id)?;
        Ok((interval, outcome))
    }

    /// Runs classification and ledger creation for one finalized interval.
    /// Reprocessing is a no-op: an interval that already produced a ledger
    /// entry reports `AlreadyProcessed`, with the store's uniqueness index
    /// on the source interval as the concurrent-finalization backstop.
    pub fn process_attendance_for_toil(
        &self,
        interval_id: u64,
    ) -> Result<ProcessOutcome, ToilError> {
        let interval = self
            .store
            .attendance(interval_id)
            .ok_or(ToilError::UnknownInterval(interval_id))?;
        if let Some(existing) = self.ledger.entry_for_interval(interval_id) {
            debug!(interval_id, entry_id = existing.id, "interval already processed");
            return Ok(ProcessOutcome::AlreadyProcessed {
                entry_id: existing.id,
            });
        }

        let elig = eligibility::classify(&interval, self.calendar.as_ref(), &self.policy)?;
        let reason = match elig.reason() {
            Some(reason) if elig.eligible => reason,
            _ => {
                self.store.record_attendance_result(
                    interval_id,
                    elig.working_hours,
                    elig.overtime_hours,
                    None,
                )?;
                debug!(interval_id, working_hours = elig.working_hours, "no TOIL earned");
                return Ok(ProcessOutcome::NotEligible);
            }
        };

        let note = format!(
            "{} on {} ({:.2}h of {:.2}h worked)",
            reason, interval.date, elig.hours_earned, elig.working_hours
        );
        let entry_id = match self.ledger.create_entry(
            interval.employee_id,
            elig.hours_earned,
            interval.date,
            interval_id,
            note,
        ) {
            Ok(id) => id,
            // Lost a concurrent finalization race; the other writer's entry
            // stands.
            Err(ToilError::DuplicateSourceInterval(_)) => {
                let existing = self
                    .ledger
                    .entry_for_interval(interval_id)
                    .ok_or(ToilError::UnknownInterval(interval_id))?;
                return Ok(ProcessOutcome::AlreadyProcessed {
                    entry_id: existing.id,
                });
            }
            Err(e) => return Err(e),
        };
        self.store.record_attendance_result(
            interval_id,
            elig.working_hours,
            elig.overtime_hours,
            Some(entry_id),
        )?;

        Ok(ProcessOutcome::Credited {
            entry_id,
            hours_earned: elig.hours_earned,
            reason,
        })
    }

    pub fn get_user_toil_balance(
        &self,
        employee_id: u64,
        now: NaiveDate,
        warning_horizon_days: Option<i64>,
    ) -> BalanceSummary {
        let horizon = warning_horizon_days.unwrap_or(self.policy.warning_horizon_days);
        self.balance.balance(employee_id, now, horizon)
    }

    pub fn use_toil_hours(&self, employee_id: u64, hours: f64) -> Result<UsageOutcome, ToilError> {
        self.consumption.use_hours(employee_id, hours)
    }

    pub fn expire_old_toil(&self, now: NaiveDate) -> usize {
        self.sweep.run(now)
    }

    pub fn list_entries(&self, employee_id: u64) -> Vec<ToilEntry> {
        self.ledger.list_entries(employee_id)
    }
}
