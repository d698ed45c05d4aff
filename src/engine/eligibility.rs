//! TOIL eligibility classification.
//!
//! Pure decision over a finalized attendance interval: no side effects, the
//! processor persists the result. Idempotency (one ledger entry per
//! interval) is the processor's job, backed by the store's uniqueness index.

use strum_macros::{Display, EnumString};

use crate::config::ToilPolicy;
use crate::engine::time;
use crate::error::ToilError;
use crate::model::attendance::AttendanceInterval;
use crate::model::holiday::HolidayCalendar;

/// Why an interval earned credit. Ordering of the variants reflects note
/// precedence: holiday work outranks weekend work outranks overtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ToilReason {
    Holiday,
    Weekend,
    Overtime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Eligibility {
    pub eligible: bool,
    pub hours_earned: f64,
    pub working_hours: f64,
    pub overtime_hours: f64,
    pub weekend_work: bool,
    pub holiday_work: bool,
}

impl Eligibility {
    pub fn reason(&self) -> Option<ToilReason> {
        if self.holiday_work {
            Some(ToilReason::Holiday)
        } else if self.weekend_work {
            Some(ToilReason::Weekend)
        } else if self.overtime_hours > 0.0 {
            Some(ToilReason::Overtime)
        } else {
            None
        }
    }
}

/// Classifies a finalized interval.
///
/// Weekend and holiday shifts count in full (the whole shift is bonus time);
/// a weekday shift earns only the hours past the standard day. Errors with
/// `IntervalOpen` when the interval has no check-out yet.
pub fn classify(
    interval: &AttendanceInterval,
    calendar: &dyn HolidayCalendar,
    policy: &ToilPolicy,
) -> Result<Eligibility, ToilError> {
    let check_out = interval
        .check_out
        .ok_or(ToilError::IntervalOpen(interval.id))?;
    let working = time::working_hours(interval.check_in, check_out)?;
    let overtime = time::round_hours((working - policy.standard_daily_hours).max(0.0));
    let weekend_work = time::is_weekend(interval.date, &policy.weekend_days);
    let holiday_work = time::is_holiday(interval.date, calendar);

    let hours_earned = if weekend_work || holiday_work {
        working
    } else {
        overtime
    };

    Ok(Eligibility {
        eligible: hours_earned > 0.0,
        hours_earned,
        working_hours: working,
        overtime_hours: overtime,
        weekend_work,
        holiday_work,
    })
}
