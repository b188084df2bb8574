//! Project completion metrics.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::format::format_hours_rounded;
use crate::types::{Issue, StatusCategory, Worklog};

/// Logged time against the summed original estimates, as a whole percent
/// clamped to 100. Zero when nothing is estimated.
pub fn estimate_completion(issues: &[Issue], worklogs: &[Worklog]) -> u32 {
    let estimated: u64 = issues.iter().filter_map(|i| i.original_estimate_seconds).sum();
    if estimated == 0 {
        return 0;
    }
    let logged: u64 = worklogs.iter().map(|w| w.time_spent_seconds).sum();
    let estimated_hours = estimated as f64 / 3600.0;
    let logged_hours = logged as f64 / 3600.0;
    ((logged_hours / estimated_hours * 100.0).round() as u32).min(100)
}

/// Share of issues in the done category, as a whole percent.
pub fn status_completion(issues: &[Issue]) -> u32 {
    if issues.is_empty() {
        return 0;
    }
    let done = issues
        .iter()
        .filter(|i| i.status_category == StatusCategory::Done)
        .count();
    (done as f64 / issues.len() as f64 * 100.0).round() as u32
}

/// Seconds logged per issue key.
pub fn logged_by_issue(worklogs: &[Worklog]) -> HashMap<&str, u64> {
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for worklog in worklogs {
        *totals.entry(worklog.issue_key.as_str()).or_default() += worklog.time_spent_seconds;
    }
    totals
}

/// Headline numbers for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectMetrics {
    pub estimate_completion_pct: u32,
    pub status_completion_pct: u32,
    pub issue_count: usize,
    pub done_count: usize,
    pub total_logged_seconds: u64,
    pub estimated_seconds: u64,
    pub worklog_count: usize,
    /// Seconds logged per issue key, ordered by key
    pub logged_by_issue: BTreeMap<String, u64>,
}

impl ProjectMetrics {
    pub fn compute(issues: &[Issue], worklogs: &[Worklog]) -> Self {
        Self {
            estimate_completion_pct: estimate_completion(issues, worklogs),
            status_completion_pct: status_completion(issues),
            issue_count: issues.len(),
            done_count: issues
                .iter()
                .filter(|i| i.status_category == StatusCategory::Done)
                .count(),
            total_logged_seconds: worklogs.iter().map(|w| w.time_spent_seconds).sum(),
            estimated_seconds: issues.iter().filter_map(|i| i.original_estimate_seconds).sum(),
            worklog_count: worklogs.len(),
            logged_by_issue: logged_by_issue(worklogs)
                .into_iter()
                .map(|(key, seconds)| (key.to_string(), seconds))
                .collect(),
        }
    }

    pub fn total_hours_display(&self) -> String {
        format_hours_rounded(self.total_logged_seconds)
    }
}
