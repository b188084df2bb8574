//! Declarative issue filters applied before the hierarchy is built.

use serde::{Deserialize, Serialize};

use crate::types::{DateRange, Issue, StatusCategory};

/// Assignee filter value that selects issues nobody is assigned to.
pub const UNASSIGNED: &str = "Unassigned";

/// Conjunctive issue filter. Empty criteria are inactive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssueFilter {
    /// Issue type names to keep (case-insensitive)
    #[serde(default)]
    pub issue_types: Vec<String>,
    /// Status categories to keep
    #[serde(default)]
    pub statuses: Vec<StatusCategory>,
    /// Assignee display name, or [`UNASSIGNED`]
    #[serde(default)]
    pub assignee: Option<String>,
    /// Keep issues whose start/due span intersects this range
    #[serde(default)]
    pub range: DateRange,
    /// Case-insensitive substring over key and summary
    #[serde(default)]
    pub search: Option<String>,
}

impl IssueFilter {
    pub fn is_empty(&self) -> bool {
        self.issue_types.is_empty()
            && self.statuses.is_empty()
            && self.assignee.is_none()
            && self.range.is_open()
            && self.search.as_deref().map_or(true, |s| s.trim().is_empty())
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        self.matches_type(issue)
            && self.matches_status(issue)
            && self.matches_assignee(issue)
            && self.matches_range(issue)
            && self.matches_search(issue)
    }

    /// Keep matching issues, in input order.
    pub fn apply(&self, issues: &[Issue]) -> Vec<Issue> {
        issues
            .iter()
            .filter(|issue| self.matches(issue))
            .cloned()
            .collect()
    }

    fn matches_type(&self, issue: &Issue) -> bool {
        self.issue_types.is_empty()
            || self
                .issue_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&issue.issue_type))
    }

    fn matches_status(&self, issue: &Issue) -> bool {
        self.statuses.is_empty() || self.statuses.contains(&issue.status_category)
    }

    fn matches_assignee(&self, issue: &Issue) -> bool {
        match (self.assignee.as_deref(), issue.assignee.as_deref()) {
            (None, _) => true,
            (Some(wanted), None) => wanted.eq_ignore_ascii_case(UNASSIGNED),
            (Some(wanted), Some(actual)) => wanted.to_lowercase() == actual.to_lowercase(),
        }
    }

    fn matches_range(&self, issue: &Issue) -> bool {
        if self.range.is_open() {
            return true;
        }
        match (issue.start_date, issue.due_date) {
            (Some(start), Some(due)) => self.range.overlaps(start, due),
            (Some(date), None) | (None, Some(date)) => self.range.contains(date),
            (None, None) => false,
        }
    }

    fn matches_search(&self, issue: &Issue) -> bool {
        let query = match self.search.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q.to_lowercase(),
            _ => return true,
        };
        issue.key.to_lowercase().contains(&query) || issue.summary.to_lowercase().contains(&query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<Issue> {
        let mut epic = Issue::new("ACME-1", "Checkout revamp", "Epic");
        epic.start_date = Some(ymd(2024, 1, 1));
        epic.due_date = Some(ymd(2024, 3, 31));
        epic.status_category = StatusCategory::InProgress;

        let mut story = Issue::new("ACME-2", "Payment form", "Story");
        story.assignee = Some("Ada".to_string());
        story.due_date = Some(ymd(2024, 2, 10));
        story.status_category = StatusCategory::Done;

        let task = Issue::new("ACME-3", "Write tests", "Task");

        vec![epic, story, task]
    }

    fn keys(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.key.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = IssueFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&sample()).len(), 3);
    }

    #[test]
    fn test_type_and_status() {
        let filter = IssueFilter {
            issue_types: vec!["story".to_string(), "epic".to_string()],
            statuses: vec![StatusCategory::Done],
            ..Default::default()
        };
        assert_eq!(keys(&filter.apply(&sample())), vec!["ACME-2"]);
    }

    #[test]
    fn test_assignee_and_unassigned() {
        let issues = sample();
        let filter = IssueFilter {
            assignee: Some("ada".to_string()),
            ..Default::default()
        };
        assert_eq!(keys(&filter.apply(&issues)), vec!["ACME-2"]);

        let filter = IssueFilter {
            assignee: Some(UNASSIGNED.to_string()),
            ..Default::default()
        };
        assert_eq!(keys(&filter.apply(&issues)), vec!["ACME-1", "ACME-3"]);
    }

    #[test]
    fn test_date_range_excludes_undated() {
        let filter = IssueFilter {
            range: DateRange::new(Some(ymd(2024, 2, 1)), Some(ymd(2024, 2, 28))),
            ..Default::default()
        };
        assert_eq!(keys(&filter.apply(&sample())), vec!["ACME-1", "ACME-2"]);

        let filter = IssueFilter {
            range: DateRange::new(Some(ymd(2024, 3, 1)), None),
            ..Default::default()
        };
        assert_eq!(keys(&filter.apply(&sample())), vec!["ACME-1"]);
    }

    #[test]
    fn test_search_key_and_summary() {
        let filter = IssueFilter {
            search: Some("PAYMENT".to_string()),
            ..Default::default()
        };
        assert_eq!(keys(&filter.apply(&sample())), vec!["ACME-2"]);

        let filter = IssueFilter {
            search: Some("acme-3".to_string()),
            ..Default::default()
        };
        assert_eq!(keys(&filter.apply(&sample())), vec!["ACME-3"]);
    }

    #[test]
    fn test_filter_idempotent() {
        let filter = IssueFilter {
            statuses: vec![StatusCategory::Todo, StatusCategory::InProgress],
            search: Some("acme".to_string()),
            ..Default::default()
        };
        let once = filter.apply(&sample());
        let twice = filter.apply(&once);
        assert_eq!(once, twice);
    }
}
