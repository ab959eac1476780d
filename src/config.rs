use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Result, TrackerError};

pub const DEFAULT_DATABASE_PATH: &str = "wedding_ledger.db";
/// Asia/Colombo has no daylight saving, so a fixed offset is exact.
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 30;
pub const DEFAULT_PENDING_HORIZON_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub database_path: PathBuf,
    pub utc_offset: FixedOffset,
    pub default_time: NaiveTime,
    pub cache_ttl: Duration,
    pub wedding_date: Option<NaiveDate>,
    /// Categories below this share of total spend are merged into "Other".
    pub small_slice_percent: Decimal,
    pub pending_horizon_days: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_SECS).unwrap_or_else(utc),
            default_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            wedding_date: None,
            small_slice_percent: Decimal::new(5, 0),
            pending_horizon_days: DEFAULT_PENDING_HORIZON_DAYS,
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

impl TrackerConfig {
    /// Current wall-clock instant in the configured offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.utc_offset)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Parses offsets written as `+05:30`, `-0400` or `Z`.
pub fn parse_utc_offset(input: &str) -> Result<FixedOffset> {
    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(utc());
    }
    let invalid = || {
        TrackerError::validation(format!(
            "Invalid UTC offset '{}'. Use the form +HH:MM.",
            input
        ))
    };

    let (sign, rest) = match trimmed.chars().next() {
        Some('+') => (1, &trimmed[1..]),
        Some('-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
