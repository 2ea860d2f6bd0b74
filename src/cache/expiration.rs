//! Expiration expressions.
//!
//! An expiration is either a plain number of seconds or a human readable
//! expression that is resolved against the current time:
//!
//! - integers: `"30"` (seconds)
//! - friendly or ISO 8601 durations: `"10 seconds"`, `"2 minutes"`,
//!   `"1 hour 30 minutes"`, `"+5 min"`, `"3 days ago"`, `"PT10S"`
//! - keywords: `now`, `today` / `midnight`, `tomorrow`, `yesterday`
//! - RFC 3339 timestamps: `"2030-01-01T00:00:00Z"`
//! - civil dates and datetimes in the system time zone: `"2030-01-01"`,
//!   `"2030-01-01 12:30"`

use std::time::Duration;

use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use jiff::{Span, Timestamp, Zoned};
use serde::{Deserialize, Serialize};

use crate::cache::CacheError;

/// Requested lifetime of a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expiration {
    /// Seconds from now. Zero or negative means "already expired".
    Seconds(i64),
    /// Expression resolved relative to the moment the entry is written.
    Expression(String),
}

impl Expiration {
    /// Resolve to whole seconds from now.
    pub fn resolve(&self) -> Result<i64, CacheError> {
        match self {
            Expiration::Seconds(seconds) => Ok(*seconds),
            Expiration::Expression(expr) => seconds_from_now(expr, &Zoned::now()),
        }
    }
}

impl From<i64> for Expiration {
    fn from(seconds: i64) -> Self {
        Expiration::Seconds(seconds)
    }
}

/// Partial seconds round up, so a non-zero duration never means "expired".
impl From<Duration> for Expiration {
    fn from(duration: Duration) -> Self {
        let seconds = duration
            .as_secs()
            .saturating_add(u64::from(duration.subsec_nanos() > 0));
        Expiration::Seconds(i64::try_from(seconds).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Expiration {
    fn from(expr: &str) -> Self {
        Expiration::Expression(expr.to_string())
    }
}

impl From<String> for Expiration {
    fn from(expr: String) -> Self {
        Expiration::Expression(expr)
    }
}

/// Resolve `expr` to the number of seconds between `now` and the moment it
/// denotes.
pub fn seconds_from_now(expr: &str, now: &Zoned) -> Result<i64, CacheError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(CacheError::invalid_expiration(expr, "empty expression"));
    }

    if let Ok(seconds) = trimmed.parse::<i64>() {
        return Ok(seconds);
    }

    let target = resolve_target(trimmed, now)
        .ok_or_else(|| CacheError::invalid_expiration(expr, "unrecognized time expression"))?;

    Ok(target.as_second() - now.timestamp().as_second())
}

fn resolve_target(expr: &str, now: &Zoned) -> Option<Timestamp> {
    if let Some(target) = resolve_keyword(expr, now) {
        return Some(target);
    }

    let relative = expr.strip_prefix('+').map(str::trim_start).unwrap_or(expr);
    if let Ok(span) = relative.parse::<Span>() {
        return now.checked_add(span).ok().map(|zoned| zoned.timestamp());
    }

    if let Ok(timestamp) = expr.parse::<Timestamp>() {
        return Some(timestamp);
    }

    let tz = TimeZone::system();
    if let Ok(datetime) = expr.parse::<DateTime>() {
        return datetime.to_zoned(tz.clone()).ok().map(|zoned| zoned.timestamp());
    }

    if let Ok(date) = expr.parse::<Date>() {
        return date
            .at(0, 0, 0, 0)
            .to_zoned(tz)
            .ok()
            .map(|zoned| zoned.timestamp());
    }

    None
}

fn resolve_keyword(expr: &str, now: &Zoned) -> Option<Timestamp> {
    let zoned = match expr.to_ascii_lowercase().as_str() {
        "now" => Ok(now.clone()),
        "today" | "midnight" => now.start_of_day(),
        "tomorrow" => now.tomorrow().and_then(|day| day.start_of_day()),
        "yesterday" => now.yesterday().and_then(|day| day.start_of_day()),
        _ => return None,
    };
    zoned.ok().map(|zoned| zoned.timestamp())
}
