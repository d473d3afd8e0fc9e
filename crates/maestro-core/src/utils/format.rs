use chrono::{DateTime, Local};

use crate::auth::parse_expiry;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Render a 0.0-1.0 score as a whole percentage
pub fn percent(score: f64) -> String {
    format!("{:.0}%", (score * 100.0).clamp(0.0, 100.0))
}

/// Fixed-width text bar for a 0-100 share
pub fn bar(share: f64, width: usize) -> String {
    let filled = ((share.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

/// Format a backend timestamp as a local date, passing unparseable values through
pub fn format_date(value: &str) -> String {
    match parse_expiry(value) {
        Some(utc) => {
            let local: DateTime<Local> = utc.with_timezone(&Local);
            local.format("%b %-d, %Y").to_string()
        }
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long playlist name", 10), "a long ...");
        assert_eq!(truncate("abcdef", 2), "ab");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.424), "42%");
        assert_eq!(percent(1.7), "100%");
        assert_eq!(percent(-0.2), "0%");
    }

    #[test]
    fn test_bar() {
        assert_eq!(bar(50.0, 10), "#####.....");
        assert_eq!(bar(0.0, 4), "....");
        assert_eq!(bar(250.0, 4), "####");
    }

    #[test]
    fn test_format_date_passthrough() {
        assert_eq!(format_date("not a date"), "not a date");
        assert!(format_date("2025-06-15T12:00:00Z").contains("2025"));
    }
}
