// src/utils/date.rs

//! Deadline countdown and relative-time helpers.
//!
//! Timestamps without a zone are read in the configured listing offset.
//! Every helper takes `now` explicitly so callers decide the clock.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ListingConfig, LocaleConfig};

const MS_PER_HOUR: i64 = 60 * 60 * 1000;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d", "%Y%m%d"];

/// Parse a date or timestamp string.
///
/// Accepts RFC 3339, common naive datetime layouts and plain dates
/// (read as midnight). Returns `None` for anything else.
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim().trim_end_matches('.');
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    let naive = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    offset.from_local_datetime(&naive).single()
}

/// Milliseconds since the epoch, or `0` when the string cannot be parsed.
pub fn epoch_millis_or_zero(raw: &str, offset: FixedOffset) -> i64 {
    parse_timestamp(raw, offset)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// Whole days left until the deadline, rounded up and never negative.
///
/// Always-open sentinels yield `always_open_days`; unparseable deadlines
/// yield `unparseable_deadline_days`.
pub fn days_until(deadline: &str, now: DateTime<Utc>, config: &ListingConfig) -> i64 {
    if config.is_always_open(deadline) {
        return config.always_open_days;
    }

    let offset = config.utc_offset().unwrap_or_else(|| Utc.fix());
    let Some(deadline) = parse_timestamp(deadline, offset) else {
        return config.unparseable_deadline_days;
    };

    let diff_ms = deadline.timestamp_millis() - now.timestamp_millis();
    if diff_ms <= 0 {
        return 0;
    }
    (diff_ms + MS_PER_DAY - 1) / MS_PER_DAY
}

/// Calendar-day countdown to a deadline, for detail views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineInfo {
    /// Signed whole days between today and the deadline date
    pub d_day: i64,
    pub is_expired: bool,
    pub display: String,
}

/// Countdown on date boundaries in the listing offset.
///
/// Returns `None` for always-open sentinels and unparseable deadlines.
pub fn deadline_info(
    deadline: &str,
    now: DateTime<Utc>,
    config: &ListingConfig,
    locale: &LocaleConfig,
) -> Option<DeadlineInfo> {
    if config.is_always_open(deadline) {
        return None;
    }

    let offset = config.utc_offset().unwrap_or_else(|| Utc.fix());
    let deadline = parse_timestamp(deadline, offset)?
        .with_timezone(&offset)
        .date_naive();
    let today = now.with_timezone(&offset).date_naive();
    let d_day = (deadline - today).num_days();

    let display = match d_day {
        0 => locale.closes_today.clone(),
        d if d > 0 => locale.d_day(d),
        _ => locale.closed.clone(),
    };

    Some(DeadlineInfo {
        d_day,
        is_expired: d_day < 0,
        display,
    })
}

/// Elapsed time since `updated` as a display string.
pub fn relative_time(
    updated: &str,
    now: DateTime<Utc>,
    offset: FixedOffset,
    locale: &LocaleConfig,
) -> String {
    let Some(updated) = parse_timestamp(updated, offset) else {
        return locale.recently.clone();
    };

    let hours = (now.timestamp_millis() - updated.timestamp_millis()).div_euclid(MS_PER_HOUR);
    if hours < 1 {
        return locale.just_now.clone();
    }
    if hours < 24 {
        return locale.hours_ago(hours);
    }
    locale.days_ago(hours / 24)
}
