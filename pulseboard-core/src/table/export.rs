//! CSV export of worklog rows.

use std::io::Write;

use crate::format::format_decimal_hours;
use crate::types::Worklog;

pub const CSV_HEADER: &str = "Issue Key,Issue Summary,Author,Hours,Date,Description";

/// Write the header and one line per worklog.
pub fn write_csv<'a, W: Write>(
    out: &mut W,
    worklogs: impl IntoIterator<Item = &'a Worklog>,
) -> std::io::Result<()> {
    writeln!(out, "{}", CSV_HEADER)?;
    for worklog in worklogs {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            escape(&worklog.issue_key),
            quote(&worklog.issue_summary),
            escape(worklog.resolved_author().unwrap_or_default()),
            format_decimal_hours(worklog.time_spent_seconds),
            escape(&worklog.start_date),
            quote(worklog.description.as_deref().unwrap_or_default()),
        )?;
    }
    Ok(())
}

pub fn to_csv_string<'a>(worklogs: impl IntoIterator<Item = &'a Worklog>) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_csv(&mut buf, worklogs);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Always quote, doubling embedded quotes.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Quote only when the field would otherwise break the row.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        quote(field)
    } else {
        field.to_string()
    }
}
