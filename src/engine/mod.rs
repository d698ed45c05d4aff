pub mod balance;
pub mod consumption;
pub mod eligibility;
pub mod expiry;
pub mod ledger;
pub mod processor;
pub mod time;
