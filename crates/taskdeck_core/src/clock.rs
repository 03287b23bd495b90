//! Epoch-millisecond time helpers.
//!
//! Storage keeps every timestamp as Unix epoch milliseconds; these helpers
//! convert at the edges (defaults, CLI input, display).

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

const DEFAULT_DUE_DAYS: i64 = 7;

/// Current time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Due date applied when a task or area is created without one.
pub fn default_due_ms(created_at_ms: i64) -> i64 {
    created_at_ms + Duration::days(DEFAULT_DUE_DAYS).num_milliseconds()
}

/// Parses `YYYY-MM-DD` (midnight UTC) or `YYYY-MM-DD HH:MM` into epoch ms.
pub fn parse_date_ms(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|datetime| datetime.and_utc().timestamp_millis());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M")
        .ok()
        .map(|datetime| datetime.and_utc().timestamp_millis())
}

/// Formats epoch ms as `YYYY-MM-DD HH:MM` UTC. Out-of-range values render as `-`.
pub fn format_ms(value: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(value)
        .map(|datetime| datetime.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::{default_due_ms, format_ms, parse_date_ms};

    #[test]
    fn default_due_is_seven_days_later() {
        assert_eq!(default_due_ms(0), 7 * 24 * 60 * 60 * 1000);
    }

    #[test]
    fn parse_and_format_agree() {
        let ms = parse_date_ms("2024-03-01").unwrap();
        assert_eq!(format_ms(ms), "2024-03-01 00:00");
        let ms = parse_date_ms("2024-03-01 09:30").unwrap();
        assert_eq!(format_ms(ms), "2024-03-01 09:30");
        assert!(parse_date_ms("next tuesday").is_none());
    }
}
