//! Jira issue payloads
//!
//! Normalizes search results from `/rest/api/3/search` and the flattened
//! issue records produced by the dashboard proxy.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use super::{collect_records, parse_date, parse_date_value, record_array, PersonField};
use crate::error::Result;
use crate::types::{Issue, StatusCategory};

/// One page of `/rest/api/3/search`.
#[derive(Debug, Deserialize)]
pub struct JiraSearchResponse {
    #[serde(rename = "startAt", default)]
    pub start_at: usize,
    #[serde(rename = "maxResults", default)]
    pub max_results: usize,
    #[serde(default)]
    pub total: usize,
    /// Kept raw so one malformed issue does not sink the page
    #[serde(default)]
    pub issues: Vec<Value>,
}

/// Issue as returned by the Jira REST API.
#[derive(Debug, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    pub fields: JiraFields,
}

#[derive(Debug, Deserialize)]
pub struct JiraFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<JiraStatus>,
    #[serde(default)]
    pub issuetype: Option<JiraNamed>,
    #[serde(default)]
    pub parent: Option<JiraKeyRef>,
    #[serde(default)]
    pub duedate: Option<String>,
    #[serde(default)]
    pub assignee: Option<PersonField>,
    #[serde(default)]
    pub timeoriginalestimate: Option<i64>,
    /// Custom fields, including the configured start-date field
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct JiraStatus {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "statusCategory", default)]
    pub status_category: Option<JiraStatusCategory>,
}

#[derive(Debug, Deserialize)]
pub struct JiraStatusCategory {
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JiraNamed {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JiraKeyRef {
    #[serde(default)]
    pub key: Option<String>,
}

/// Issue as flattened by the dashboard proxy.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatIssue {
    pub key: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub status_category: Option<String>,
    #[serde(default)]
    pub assignee: Option<PersonField>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub parent_key: Option<String>,
    #[serde(default)]
    pub original_estimate_seconds: Option<i64>,
}

/// Either issue payload family.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum IssuePayload {
    Rest(JiraIssue),
    Flat(FlatIssue),
}

const UNKNOWN_TYPE: &str = "Unknown";

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn estimate(seconds: Option<i64>) -> Option<u64> {
    seconds.and_then(|s| u64::try_from(s).ok())
}

/// Normalize one issue payload.
///
/// `start_date_field` names the Jira custom field carrying the start date;
/// it is only consulted for REST payloads.
pub fn normalize_issue(payload: IssuePayload, start_date_field: &str) -> Issue {
    match payload {
        IssuePayload::Rest(issue) => {
            let fields = issue.fields;
            let (status, category) = match fields.status {
                Some(status) => (
                    non_empty(status.name),
                    status
                        .status_category
                        .and_then(|c| c.key)
                        .map(|k| StatusCategory::from_provider(&k))
                        .unwrap_or_default(),
                ),
                None => (None, StatusCategory::Todo),
            };

            Issue {
                key: issue.key,
                summary: fields.summary.unwrap_or_default(),
                issue_type: non_empty(fields.issuetype.and_then(|t| t.name))
                    .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
                status,
                status_category: category,
                assignee: fields.assignee.and_then(PersonField::into_display_name),
                start_date: parse_date_value(fields.extra.get(start_date_field)),
                due_date: fields.duedate.as_deref().and_then(parse_date),
                parent_key: non_empty(fields.parent.and_then(|p| p.key)),
                original_estimate_seconds: estimate(fields.timeoriginalestimate),
            }
        }
        IssuePayload::Flat(issue) => Issue {
            key: issue.key,
            summary: issue.summary.unwrap_or_default(),
            issue_type: non_empty(issue.issue_type).unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            status: non_empty(issue.status),
            status_category: issue
                .status_category
                .map(|c| StatusCategory::from_provider(&c))
                .unwrap_or_default(),
            assignee: issue.assignee.and_then(PersonField::into_display_name),
            start_date: issue.start_date.as_deref().and_then(parse_date),
            due_date: issue.due_date.as_deref().and_then(parse_date),
            parent_key: non_empty(issue.parent_key),
            original_estimate_seconds: estimate(issue.original_estimate_seconds),
        },
    }
}

/// Normalize raw issue records, skipping any that fail to deserialize.
pub fn normalize_issues(items: Vec<Value>, start_date_field: &str) -> Vec<Issue> {
    collect_records::<IssuePayload>(items, "issue")
        .into_iter()
        .map(|payload| normalize_issue(payload, start_date_field))
        .collect()
}

/// Normalize a JSON document holding issues.
///
/// Accepts a bare array, a proxy response `{ "issues": [...] }`, or a Jira
/// search page (which has the same `issues` field).
pub fn issues_from_value(value: Value, start_date_field: &str) -> Result<Vec<Issue>> {
    let items = record_array(value, "issues")?;
    Ok(normalize_issues(items, start_date_field))
}
