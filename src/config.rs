use std::env;
use std::str::FromStr;

use anyhow::Context;
use chrono::{NaiveDate, Weekday};
use dotenvy::dotenv;

/// TOIL accrual policy knobs.
#[derive(Debug, Clone)]
pub struct ToilPolicy {
    /// A weekday shift earns TOIL only past this many hours.
    pub standard_daily_hours: f64,
    /// Credit lapses this many days after it was earned.
    pub expiry_days: i64,
    /// Balance summaries flag credit expiring within this many days.
    pub warning_horizon_days: i64,
    /// Designated non-working days of the week.
    pub weekend_days: Vec<Weekday>,
}

impl Default for ToilPolicy {
    fn default() -> Self {
        Self {
            standard_daily_hours: 8.0,
            expiry_days: 21,
            warning_horizon_days: 7,
            weekend_days: vec![Weekday::Sat, Weekday::Sun],
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub api_prefix: String,
    pub policy: ToilPolicy,
    pub holidays: Vec<NaiveDate>,
    pub sweep_interval_secs: u64,

    // Rate limiting
    pub rate_attendance_per_min: u32,
    pub rate_toil_per_min: u32,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = ToilPolicy::default();
        let policy = ToilPolicy {
            standard_daily_hours: env::var("STANDARD_DAILY_HOURS")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .expect("STANDARD_DAILY_HOURS must be a number"),
            expiry_days: env::var("TOIL_EXPIRY_DAYS")
                .unwrap_or_else(|_| "21".to_string())
                .parse()
                .expect("TOIL_EXPIRY_DAYS must be a number of days"),
            warning_horizon_days: env::var("TOIL_WARNING_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .expect("TOIL_WARNING_DAYS must be a number of days"),
            weekend_days: match env::var("WEEKEND_DAYS") {
                Ok(raw) => parse_weekend_days(&raw)
                    .expect("WEEKEND_DAYS must be comma-separated weekday names"),
                Err(_) => defaults.weekend_days,
            },
        };

        Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),
            policy,
            holidays: parse_holidays(&env::var("HOLIDAYS").unwrap_or_default())
                .expect("HOLIDAYS must be comma-separated YYYY-MM-DD dates"),
            sweep_interval_secs: env::var("TOIL_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "86400".to_string()) // daily
                .parse()
                .expect("TOIL_SWEEP_INTERVAL_SECS must be a number of seconds"),

            rate_attendance_per_min: env::var("RATE_ATTENDANCE_PER_MIN")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .expect("RATE_ATTENDANCE_PER_MIN must be a number"),
            rate_toil_per_min: env::var("RATE_TOIL_PER_MIN")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("RATE_TOIL_PER_MIN must be a number"),
        }
    }
}

pub fn parse_weekend_days(raw: &str) -> anyhow::Result<Vec<Weekday>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Weekday::from_str(s)
                .map_err(|_| anyhow::anyhow!("unrecognized weekday name: {s:?}"))
        })
        .collect()
}

pub fn parse_holidays(raw: &str) -> anyhow::Result<Vec<NaiveDate>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("invalid holiday date: {s:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekend_days_parse_from_names() {
        let days = parse_weekend_days("Fri, Sat").unwrap();
        assert_eq!(days, vec![Weekday::Fri, Weekday::Sat]);
        assert!(parse_weekend_days("Fri,Notaday").is_err());
    }

    #[test]
    fn holidays_parse_from_dates() {
        let days = parse_holidays("2026-01-01, 2026-12-25").unwrap();
        assert_eq!(days.len(), 2);
        assert!(parse_holidays("").unwrap().is_empty());
        assert!(parse_holidays("hello").is_err());
    }
}
