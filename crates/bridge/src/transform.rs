//! Alert to notification transformation.
//!
//! Everything here is pure and infallible: missing labels, annotations and
//! timestamps degrade to fixed defaults instead of producing errors.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Local, Timelike};

use crate::sinks::GotifyMessage;
use crate::sources::{AlertManagerAlert, ZERO_TIMESTAMP};

pub const DEFAULT_ALERT_NAME: &str = "unknown";
pub const DEFAULT_SEVERITY: &str = "unknown";
pub const DEFAULT_SUMMARY: &str = "no summary";
pub const DEFAULT_DESCRIPTION: &str = "no details";
pub const DEFAULT_PRIORITY: i32 = 5;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// Looks up `key`, returning `default` when the key is absent.
pub fn lookup_or<'a>(map: &'a HashMap<String, String>, key: &str, default: &'a str) -> &'a str {
    map.get(key).map(String::as_str).unwrap_or(default)
}

/// Maps an Alertmanager severity label onto a Gotify priority (1-10).
pub fn severity_priority(severity: &str) -> i32 {
    match severity.to_lowercase().as_str() {
        "critical" => 8,
        "warning" => 5,
        "info" => 3,
        _ => DEFAULT_PRIORITY,
    }
}

/// Strict RFC 3339: upper-case `T` separator, `Z` or a `+hh:mm` offset,
/// optional fraction, no leap second.
fn parse_wire_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    // chrono skips whitespace ahead of numeric fields
    if raw.contains(char::is_whitespace) {
        return None;
    }
    let utc;
    let candidate = match raw.strip_suffix('Z') {
        Some(rest) => {
            utc = format!("{}+00:00", rest);
            utc.as_str()
        }
        None => raw,
    };
    DateTime::parse_from_str(candidate, WIRE_FORMAT)
        .ok()
        // chrono keeps `:60` as a leap second in the nanosecond field
        .filter(|ts| ts.nanosecond() < 1_000_000_000)
}

/// Renders an RFC 3339 timestamp in local time.
///
/// The zero timestamp becomes an empty string; anything that fails to parse
/// is returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    if raw == ZERO_TIMESTAMP {
        return String::new();
    }
    match parse_wire_timestamp(raw) {
        Some(ts) => ts.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

pub fn transform_alert(alert: &AlertManagerAlert) -> GotifyMessage {
    let alert_name = lookup_or(&alert.labels, "alertname", DEFAULT_ALERT_NAME);
    let severity = lookup_or(&alert.labels, "severity", DEFAULT_SEVERITY);
    let summary = lookup_or(&alert.annotations, "summary", DEFAULT_SUMMARY);
    let description = lookup_or(&alert.annotations, "description", DEFAULT_DESCRIPTION);
    let status = alert.status.to_uppercase();

    let start_time = format_timestamp(&alert.starts_at);
    let end_time = format_timestamp(&alert.ends_at);
    let time_line = if status == "RESOLVED" && !end_time.is_empty() {
        format!("Resolved: {}", end_time)
    } else {
        format!("Triggered: {}", start_time)
    };

    GotifyMessage {
        title: format!("[{}] {} ({})", severity, alert_name, status),
        message: format!("{}\n{}\n{}", summary, description, time_line),
        priority: severity_priority(severity),
    }
}
