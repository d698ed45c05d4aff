use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use chrono::NaiveDate;

/// Holiday lookup collaborator, injected into the classifier so the engine
/// can be exercised with synthetic calendars.
pub trait HolidayCalendar: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// Set-backed calendar, seeded from configuration and maintainable at
/// runtime through the holiday admin endpoint.
#[derive(Debug, Default)]
pub struct FixedHolidayCalendar {
    days: RwLock<HashSet<NaiveDate>>,
}

impl FixedHolidayCalendar {
    pub fn new(days: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            days: RwLock::new(days.into_iter().collect()),
        }
    }

    /// Returns false if the date was already a holiday.
    pub fn add(&self, date: NaiveDate) -> bool {
        self.days
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(date)
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days: Vec<NaiveDate> = self
            .days
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect();
        days.sort();
        days
    }
}

impl HolidayCalendar for FixedHolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.days
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&date)
    }
}
