use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One employee's check-in/check-out pair for a calendar day.
///
/// Created at check-in, finalized at check-out. The derived fields
/// (`working_hours`, `overtime_hours`, `toil_entry_id`) are filled in exactly
/// once, when the finalized interval runs through the TOIL pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceInterval {
    pub id: u64,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>,
    /// Elapsed hours, 2-decimal. Never computed before check-out exists.
    pub working_hours: Option<f64>,
    pub overtime_hours: Option<f64>,
    pub weekend: bool,
    pub holiday: bool,
    /// Ledger linkage; set when the interval earned TOIL credit.
    pub toil_entry_id: Option<u64>,
}

impl AttendanceInterval {
    pub fn is_finalized(&self) -> bool {
        self.check_out.is_some()
    }
}
