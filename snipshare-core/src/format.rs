//! Formatting helpers shared by the CLI views.

use chrono::{DateTime, Utc};

/// Format a timestamp as relative time (e.g., "2m ago").
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    format_relative_time_from(ts, Utc::now())
}

fn format_relative_time_from(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(ts);

    if duration.num_seconds() < 0 {
        "just now".to_string()
    } else if duration.num_seconds() < 60 {
        format!("{}s ago", duration.num_seconds())
    } else if duration.num_minutes() < 60 {
        format!("{}m ago", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d ago", duration.num_days())
    } else {
        ts.format("%b %d").to_string()
    }
}

/// Format an optional timestamp as relative time, or "never" if missing.
pub fn format_relative_time_opt(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => format_relative_time(ts),
        None => "never".to_string(),
    }
}

/// Attachment size in kilobytes with two decimals ("12.50 KB").
pub fn format_file_size(bytes: u64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// First `max_chars` characters of `text`, with `...` when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(format_relative_time_from(now - Duration::seconds(5), now), "5s ago");
        assert_eq!(format_relative_time_from(now - Duration::minutes(3), now), "3m ago");
        assert_eq!(format_relative_time_from(now - Duration::hours(2), now), "2h ago");
        assert_eq!(format_relative_time_from(now + Duration::seconds(5), now), "just now");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 30), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("héllo", 2), "hé...");
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1536), "1.50 KB");
    }
}
