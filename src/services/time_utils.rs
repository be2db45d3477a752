use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::error::{AppError, AppResult};

static CLOCK_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2})[:.uh](\d{2})(?::(\d{2}))?$").expect("clock label pattern is valid")
});

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parses the start of a timeslot label such as `19:00`, `19u30` or
/// `19:00-20:30`. Anything else yields `None`.
pub fn parse_clock_label(label: &str) -> Option<NaiveTime> {
    let start = label.split('-').next()?.trim();
    let captures = CLOCK_LABEL.captures(start)?;

    let hours: u32 = captures.get(1)?.as_str().parse().ok()?;
    let minutes: u32 = captures.get(2)?.as_str().parse().ok()?;
    let seconds: u32 = match captures.get(3) {
        Some(raw) => raw.as_str().parse().ok()?,
        None => 0,
    };

    NaiveTime::from_hms_opt(hours, minutes, seconds)
}

pub fn minutes_from_midnight(time: NaiveTime) -> i64 {
    (time.hour() as i64) * 60 + (time.minute() as i64)
}

/// Inclusive distance check on the minutes-since-midnight scale.
pub fn within_minutes(a: NaiveTime, b: NaiveTime, tolerance: i64) -> bool {
    (minutes_from_midnight(a) - minutes_from_midnight(b)).abs() <= tolerance
}

pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.trim().parse::<Tz>().map_err(|err| {
        AppError::validation_with_details(
            "unknown timezone",
            json!({"value": name, "error": err.to_string()}),
        )
    })
}

/// Splits a stored match timestamp into a league-local date and, when the
/// value carries one, a kickoff time.
///
/// Offset-bearing values are converted into `tz`; naive values are taken as
/// league-local already.
pub fn parse_match_datetime(raw: &str, tz: Tz) -> Option<(NaiveDate, Option<NaiveTime>)> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        let local = dt.with_timezone(&tz).naive_local();
        return Some((local.date(), Some(local.time())));
    }

    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%#z") {
        let local = dt.with_timezone(&tz).naive_local();
        return Some((local.date(), Some(local.time())));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some((naive.date(), Some(naive.time())));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| (date, None))
}
