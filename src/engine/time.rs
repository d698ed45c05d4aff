//! Pure working-time arithmetic.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};

use crate::error::ToilError;
use crate::model::holiday::HolidayCalendar;

/// Standard 2-decimal rounding for hour quantities (round half away from
/// zero, not truncation).
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Elapsed time between check-in and check-out in hours, 2-decimal.
pub fn working_hours(
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
) -> Result<f64, ToilError> {
    if check_out <= check_in {
        return Err(ToilError::InvalidInterval);
    }
    let seconds = (check_out - check_in).num_seconds() as f64;
    Ok(round_hours(seconds / 3600.0))
}

/// True when `date` falls on one of the policy's non-working weekdays.
pub fn is_weekend(date: NaiveDate, weekend_days: &[Weekday]) -> bool {
    weekend_days.contains(&date.weekday())
}

/// Date-granularity holiday check against the injected calendar.
pub fn is_holiday(date: NaiveDate, calendar: &dyn HolidayCalendar) -> bool {
    calendar.is_holiday(date)
}
