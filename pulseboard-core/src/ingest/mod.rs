//! Normalization of Jira and Tempo payloads
//!
//! Provider payloads arrive in two families:
//!
//! - the REST shapes returned by Jira (`/rest/api/3/search`) and Tempo (`/4/worklogs`)
//! - the flattened camelCase shapes produced by the dashboard's proxy functions
//!
//! Both are normalized into [`Issue`](crate::types::Issue) and
//! [`Worklog`](crate::types::Worklog) here. Nothing downstream branches on
//! payload shape.
//!
//! ## Design Principles
//!
//! 1. **Fail closed**: malformed dates become `None`, never errors
//! 2. **Resilience**: a record that fails to deserialize is logged and skipped
//! 3. **One person shape**: assignee/author strings and `{displayName}` objects
//!    collapse to `Option<String>`

pub mod jira;
pub mod tempo;

pub use jira::{issues_from_value, normalize_issue, normalize_issues, IssuePayload, JiraSearchResponse};
pub use tempo::{normalize_worklog, normalize_worklogs, worklogs_from_value, TempoPage, WorklogPayload};

use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// A person reference as providers deliver it: either a plain display name
/// or an account object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PersonField {
    Name(String),
    Account {
        #[serde(rename = "displayName", default)]
        display_name: Option<String>,
    },
}

impl PersonField {
    /// The trimmed display name, if any.
    pub fn into_display_name(self) -> Option<String> {
        let name = match self {
            PersonField::Name(name) => Some(name),
            PersonField::Account { display_name } => display_name,
        };
        name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
    }
}

/// Parse a calendar date from `YYYY-MM-DD` or a timestamp.
///
/// Accepts RFC 3339 and Jira's `2024-03-15T10:00:00.000+0000` form by
/// taking the date part. Returns `None` for anything else.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }

    // Date followed by a time component in some other offset notation
    if raw.len() > 10 && raw.is_char_boundary(10) {
        let (date_part, rest) = raw.split_at(10);
        if rest.starts_with('T') || rest.starts_with(' ') {
            if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
                return Some(date);
            }
        }
    }

    tracing::debug!(value = raw, "Unparseable date treated as absent");
    None
}

/// Parse an optional JSON value as a date.
pub(crate) fn parse_date_value(value: Option<&Value>) -> Option<NaiveDate> {
    value.and_then(Value::as_str).and_then(parse_date)
}

/// Deserialize each element of `items`, skipping (and logging) failures.
pub(crate) fn collect_records<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value::<T>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed {} record", what);
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::warn!(
            skipped = total - records.len(),
            total,
            "Some {} records could not be parsed",
            what
        );
    }
    records
}

/// Extract the record array from either a bare array or `{ "<field>": [...] }`.
pub(crate) fn record_array(value: Value, field: &str) -> crate::Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Array(items)) => Ok(items),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(_) => Err(crate::Error::Payload(format!(
                "expected '{}' to be an array",
                field
            ))),
        },
        Value::Null => Ok(Vec::new()),
        _ => Err(crate::Error::Payload(format!(
            "expected an array of {} or an object with a '{}' array",
            field, field
        ))),
    }
}
