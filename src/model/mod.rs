pub mod attendance;
pub mod balance;
pub mod holiday;
pub mod toil_entry;
