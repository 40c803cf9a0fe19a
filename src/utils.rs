use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;

/// Walks `path` through nested JSON objects.
/// Returns None as soon as a segment is missing.
pub fn value_at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(payload, |node, key| node.get(*key))
}

/// String at `path`, or None if absent or not a string
pub fn str_at<'a>(payload: &'a Value, path: &[&str]) -> Option<&'a str> {
    value_at(payload, path).and_then(Value::as_str)
}

/// Boolean at `path`, or None if absent or not a boolean
pub fn bool_at(payload: &Value, path: &[&str]) -> Option<bool> {
    value_at(payload, path).and_then(Value::as_bool)
}

/// Identifier at `path` rendered as text.
/// Integers are rendered in plain decimal, strings are taken as-is.
pub fn id_at(payload: &Value, path: &[&str]) -> Option<String> {
    match value_at(payload, path)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

/// Ordinal suffix for a day of month: 1 -> "st", 11 -> "th", 22 -> "nd"
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (10..=20).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// Formats an instant as `1st April 2021 - 09:30 PM UTC`
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    let day = instant.day();
    format!(
        "{}{} {}",
        day,
        ordinal_suffix(day),
        instant.format("%B %Y - %I:%M %p UTC")
    )
}
