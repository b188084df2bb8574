//! Tempo worklog payloads
//!
//! Normalizes results from Tempo's v4 worklog API and the flattened worklog
//! records produced by the dashboard proxy.

use serde::Deserialize;
use serde_json::Value;

use super::{collect_records, parse_date, record_array, PersonField};
use crate::error::Result;
use crate::types::Worklog;

/// One page of `/4/worklogs/...`.
#[derive(Debug, Deserialize)]
pub struct TempoPage {
    #[serde(default)]
    pub metadata: TempoMetadata,
    #[serde(default)]
    pub results: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TempoMetadata {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: usize,
    /// URL of the next page; absent on the last page
    #[serde(default)]
    pub next: Option<String>,
}

/// Worklog as returned by the Tempo REST API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempoWorklog {
    pub tempo_worklog_id: u64,
    #[serde(default)]
    pub issue: Option<TempoIssueRef>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub time_spent_seconds: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<PersonField>,
}

#[derive(Debug, Deserialize)]
pub struct TempoIssueRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Worklog as flattened by the dashboard proxy.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatWorklog {
    #[serde(default)]
    pub id: Option<u64>,
    /// `null` when Tempo did not resolve the issue
    #[serde(default)]
    pub issue_key: Option<String>,
    #[serde(default)]
    pub issue_summary: Option<String>,
    #[serde(default)]
    pub author: Option<PersonField>,
    #[serde(default)]
    pub assignee: Option<PersonField>,
    #[serde(default)]
    pub time_spent_seconds: i64,
    #[serde(default, alias = "date")]
    pub start_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Either worklog payload family.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WorklogPayload {
    Rest(TempoWorklog),
    Flat(FlatWorklog),
}

/// Clamp provider seconds to the non-negative invariant.
fn seconds(raw: i64, issue_key: &str) -> u64 {
    u64::try_from(raw).unwrap_or_else(|_| {
        tracing::warn!(issue_key, seconds = raw, "Negative time spent clamped to 0");
        0
    })
}

/// Normalize to `YYYY-MM-DD`; unparseable dates become an empty string,
/// which matches no date range and no month bucket.
fn iso_date(raw: Option<String>) -> String {
    raw.as_deref()
        .and_then(parse_date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn description(raw: Option<String>) -> Option<String> {
    raw.filter(|d| !d.trim().is_empty())
}

/// Normalize one worklog payload.
pub fn normalize_worklog(payload: WorklogPayload) -> Worklog {
    match payload {
        WorklogPayload::Rest(w) => {
            let (issue_key, issue_summary) = match w.issue {
                Some(issue) => (
                    issue
                        .key
                        .or_else(|| issue.id.map(|id| id.to_string()))
                        .unwrap_or_default(),
                    issue.summary.unwrap_or_default(),
                ),
                None => (String::new(), String::new()),
            };
            Worklog {
                id: Some(w.tempo_worklog_id),
                time_spent_seconds: seconds(w.time_spent_seconds, &issue_key),
                issue_key,
                issue_summary,
                author: w.author.and_then(PersonField::into_display_name),
                assignee: None,
                start_date: iso_date(w.start_date),
                description: description(w.description),
            }
        }
        WorklogPayload::Flat(w) => {
            let issue_key = w.issue_key.unwrap_or_default();
            Worklog {
                id: w.id,
                time_spent_seconds: seconds(w.time_spent_seconds, &issue_key),
                issue_key,
                issue_summary: w.issue_summary.unwrap_or_default(),
                author: w.author.and_then(PersonField::into_display_name),
                assignee: w.assignee.and_then(PersonField::into_display_name),
                start_date: iso_date(w.start_date),
                description: description(w.description),
            }
        }
    }
}

/// Normalize raw worklog records, skipping any that fail to deserialize.
pub fn normalize_worklogs(items: Vec<Value>) -> Vec<Worklog> {
    collect_records::<WorklogPayload>(items, "worklog")
        .into_iter()
        .map(normalize_worklog)
        .collect()
}

/// Normalize a JSON document holding worklogs.
///
/// Accepts a bare array or a proxy response `{ "worklogs": [...] }`.
pub fn worklogs_from_value(value: Value) -> Result<Vec<Worklog>> {
    let items = record_array(value, "worklogs")?;
    Ok(normalize_worklogs(items))
}
