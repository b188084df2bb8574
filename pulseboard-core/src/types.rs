//! Core domain types for pulseboard
//!
//! These types are the canonical shape that every Jira and Tempo payload is
//! normalized into before any hierarchy, timeline or aggregation logic runs.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Issue** | One unit of work (Epic, Story, Task, Sub-task, ...) |
//! | **Tier** | Where an issue type sits in the Epic → Story → task hierarchy |
//! | **Status category** | Coarse bucket (todo, in progress, done) of a provider status |
//! | **Worklog** | One time entry attributing seconds to an issue, author and date |
//! | **Orphan** | An issue whose declared parent is absent from the current set |

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Author name Tempo reports when it cannot resolve the account.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

// ============================================
// Status
// ============================================

/// Coarse status bucket derived from a provider-specific status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl StatusCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::Todo => "todo",
            StatusCategory::InProgress => "in_progress",
            StatusCategory::Done => "done",
        }
    }

    /// Human label with underscores replaced by spaces (e.g. "in progress").
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }

    /// Map a Jira `statusCategory.key` (or an already-canonical value).
    ///
    /// Unrecognized keys fall back to [`StatusCategory::Todo`].
    pub fn from_provider(key: &str) -> Self {
        key.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StatusCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" | "undefined" | "todo" | "to_do" => Ok(StatusCategory::Todo),
            "indeterminate" | "in_progress" | "in progress" => Ok(StatusCategory::InProgress),
            "done" => Ok(StatusCategory::Done),
            _ => Err(format!("unknown status category: {}", s)),
        }
    }
}

// ============================================
// Issue
// ============================================

/// Position of an issue type in the three-level hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueTier {
    Epic,
    Story,
    /// Task, Sub-task, Bug and every other type
    TaskLike,
}

impl IssueTier {
    /// Classify a provider issue type name.
    pub fn of(issue_type: &str) -> Self {
        match issue_type {
            "Epic" => IssueTier::Epic,
            "Story" => IssueTier::Story,
            _ => IssueTier::TaskLike,
        }
    }
}

/// A unit of work, normalized from a Jira search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique key within a result set (e.g. "PROJ-123")
    pub key: String,
    /// Free-text title
    pub summary: String,
    /// Provider type name (Epic, Story, Task, Sub-task, ...)
    pub issue_type: String,
    /// Provider status name, if known
    pub status: Option<String>,
    /// Coarse status bucket
    pub status_category: StatusCategory,
    /// Assignee display name
    pub assignee: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    /// Non-owning reference to the parent's key
    pub parent_key: Option<String>,
    pub original_estimate_seconds: Option<u64>,
}

impl Issue {
    /// Create an issue with only the required fields set.
    pub fn new(key: impl Into<String>, summary: impl Into<String>, issue_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            issue_type: issue_type.into(),
            status: None,
            status_category: StatusCategory::Todo,
            assignee: None,
            start_date: None,
            due_date: None,
            parent_key: None,
            original_estimate_seconds: None,
        }
    }

    pub fn tier(&self) -> IssueTier {
        IssueTier::of(&self.issue_type)
    }

    /// Both start and due dates are known.
    pub fn is_scheduled(&self) -> bool {
        self.start_date.is_some() && self.due_date.is_some()
    }
}

// ============================================
// Worklog
// ============================================

/// A single time-tracking entry, normalized from Tempo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worklog {
    /// Provider worklog id
    pub id: Option<u64>,
    pub issue_key: String,
    pub issue_summary: String,
    /// Author display name
    pub author: Option<String>,
    /// Fallback display name when the author is unknown
    pub assignee: Option<String>,
    pub time_spent_seconds: u64,
    /// ISO `YYYY-MM-DD`, kept as delivered so range checks compare lexicographically
    pub start_date: String,
    pub description: Option<String>,
}

impl Worklog {
    /// Resolve the name this entry is attributed to.
    ///
    /// Uses `author` unless it is absent, blank, or the literal "Unknown",
    /// then falls back to `assignee`. Returns `None` when neither resolves.
    pub fn resolved_author(&self) -> Option<&str> {
        let author = self
            .author
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty() && *a != UNKNOWN_AUTHOR);
        author.or_else(|| {
            self.assignee
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
        })
    }

    /// Issue key prefix before the first "-" (the project or epic prefix).
    pub fn key_prefix(&self) -> &str {
        self.issue_key.split('-').next().unwrap_or_default()
    }

    pub fn hours(&self) -> f64 {
        self.time_spent_seconds as f64 / 3600.0
    }
}

// ============================================
// Date range
// ============================================

/// Inclusive calendar range; either end may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }

    /// Whether `[start, end]` intersects this range.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        let (start, end) = if end < start { (end, start) } else { (start, end) };
        self.from.map_or(true, |from| end >= from) && self.to.map_or(true, |to| start <= to)
    }

    /// Inclusive check against an ISO `YYYY-MM-DD` string.
    ///
    /// ISO dates sort lexicographically in chronological order, so the
    /// comparison is done on strings.
    pub fn contains_iso(&self, date: &str) -> bool {
        self.from
            .map_or(true, |from| date >= from.format("%Y-%m-%d").to_string().as_str())
            && self
                .to
                .map_or(true, |to| date <= to.format("%Y-%m-%d").to_string().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn worklog(author: Option<&str>, assignee: Option<&str>) -> Worklog {
        Worklog {
            id: None,
            issue_key: "ACME-1".to_string(),
            issue_summary: "Login".to_string(),
            author: author.map(String::from),
            assignee: assignee.map(String::from),
            time_spent_seconds: 3600,
            start_date: "2024-03-15".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_status_category_mapping() {
        assert_eq!(StatusCategory::from_provider("new"), StatusCategory::Todo);
        assert_eq!(StatusCategory::from_provider("undefined"), StatusCategory::Todo);
        assert_eq!(
            StatusCategory::from_provider("indeterminate"),
            StatusCategory::InProgress
        );
        assert_eq!(StatusCategory::from_provider("done"), StatusCategory::Done);
        assert_eq!(
            StatusCategory::from_provider("in_progress"),
            StatusCategory::InProgress
        );
        assert_eq!(StatusCategory::from_provider("bogus"), StatusCategory::Todo);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(StatusCategory::InProgress.label(), "in progress");
        assert_eq!(StatusCategory::Done.label(), "done");
    }

    #[test]
    fn test_issue_tier() {
        assert_eq!(IssueTier::of("Epic"), IssueTier::Epic);
        assert_eq!(IssueTier::of("Story"), IssueTier::Story);
        assert_eq!(IssueTier::of("Task"), IssueTier::TaskLike);
        assert_eq!(IssueTier::of("Sub-task"), IssueTier::TaskLike);
        assert_eq!(IssueTier::of("Bug"), IssueTier::TaskLike);
    }

    #[test]
    fn test_resolved_author() {
        assert_eq!(worklog(Some("Ada"), Some("Bob")).resolved_author(), Some("Ada"));
        assert_eq!(worklog(Some("Unknown"), Some("Bob")).resolved_author(), Some("Bob"));
        assert_eq!(worklog(None, Some("Bob")).resolved_author(), Some("Bob"));
        assert_eq!(worklog(Some(" "), None).resolved_author(), None);
        assert_eq!(worklog(Some("Unknown"), None).resolved_author(), None);
    }

    #[test]
    fn test_key_prefix() {
        let mut w = worklog(None, None);
        assert_eq!(w.key_prefix(), "ACME");
        w.issue_key = "NOPREFIX".to_string();
        assert_eq!(w.key_prefix(), "NOPREFIX");
        w.issue_key = "-7".to_string();
        assert_eq!(w.key_prefix(), "");
    }

    #[test]
    fn test_date_range() {
        let range = DateRange::new(Some(date("2024-03-01")), Some(date("2024-03-31")));
        assert!(range.contains(date("2024-03-01")));
        assert!(range.contains(date("2024-03-31")));
        assert!(!range.contains(date("2024-04-01")));
        assert!(range.contains_iso("2024-03-15"));
        assert!(!range.contains_iso("2024-02-29"));
        assert!(!range.contains_iso(""));
        assert!(range.overlaps(date("2024-02-20"), date("2024-03-02")));
        assert!(!range.overlaps(date("2024-04-02"), date("2024-04-10")));
        assert!(DateRange::default().contains_iso(""));
    }
}
