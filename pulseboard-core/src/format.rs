//! Formatting helpers shared across reports.

use chrono::NaiveDate;

/// Marker rendered for pivot cells with no contributions.
pub const NO_DATA: &str = "—";

/// Compact whole-hour display (e.g. "12h"), rounding to the nearest hour.
pub fn format_hours_rounded(seconds: u64) -> String {
    let hours = (seconds as f64 / 3600.0).round() as u64;
    format!("{}h", hours)
}

/// Hour and minute display for line items (e.g. "1h 30m").
///
/// The minute suffix is omitted when it rounds to zero.
pub fn format_hours_split(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = ((seconds % 3600) as f64 / 60.0).round() as u64;
    if minutes > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}h", hours)
    }
}

/// Rounded hours, or [`NO_DATA`] when nothing was logged.
pub fn format_cell(seconds: Option<u64>) -> String {
    match seconds {
        Some(s) if s > 0 => format_hours_rounded(s),
        _ => NO_DATA.to_string(),
    }
}

/// Decimal hours with two places (e.g. "1.50").
pub fn format_decimal_hours(seconds: u64) -> String {
    format!("{:.2}", seconds as f64 / 3600.0)
}

/// Long date display used in tooltips (e.g. "Mar 5, 2024").
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Truncate to `max_chars` characters, appending "..." when shortened.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
