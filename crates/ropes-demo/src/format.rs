//! Display helpers used by the demo view models.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// `1843000` -> `"1,843,000"`.
#[must_use]
pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Lenient integer reading: numbers are truncated, strings parse their
/// leading integer (`"1200 copies"` -> `1200`). Anything else is `None`.
#[must_use]
pub fn to_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => leading_integer(s),
        _ => None,
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Parse an RFC 3339 timestamp, a naive `YYYY-MM-DDTHH:MM:SS`, or a bare
/// `YYYY-MM-DD` date (midnight UTC).
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Fuzzy relative time: `"about 3 hours ago"`, `"2 days from now"`.
///
/// Returns an empty string for values that are not dates.
#[must_use]
pub fn time_ago(raw: &str, now: DateTime<Utc>) -> String {
    let Some(then) = parse_date(raw) else {
        return String::new();
    };
    let delta = now.signed_duration_since(then);
    let (seconds, suffix) = if delta.num_milliseconds() < 0 {
        (-delta.num_milliseconds() as f64 / 1000.0, "from now")
    } else {
        (delta.num_milliseconds() as f64 / 1000.0, "ago")
    };
    format!("{} {suffix}", distance(seconds))
}

fn distance(seconds: f64) -> String {
    let minutes = seconds / 60.0;
    let hours = minutes / 60.0;
    let days = hours / 24.0;
    let years = days / 365.0;

    if seconds < 45.0 {
        "less than a minute".to_string()
    } else if seconds < 90.0 {
        "about a minute".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes", minutes.round())
    } else if minutes < 90.0 {
        "about an hour".to_string()
    } else if hours < 24.0 {
        format!("about {} hours", hours.round())
    } else if hours < 42.0 {
        "a day".to_string()
    } else if days < 30.0 {
        format!("{} days", days.round())
    } else if days < 45.0 {
        "about a month".to_string()
    } else if days < 365.0 {
        format!("{} months", (days / 30.0).round())
    } else if years < 1.5 {
        "about a year".to_string()
    } else {
        format!("{} years", years.round())
    }
}

/// A JSON value as display text: strings unquoted, `null` empty.
#[must_use]
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
