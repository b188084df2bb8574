//! Where issues and worklogs come from.
//!
//! [`IssueSource`] and [`WorklogSource`] are the seams between the fetch
//! layer and the pure report code. Jira and Tempo implement them over HTTP;
//! [`SnapshotSource`] implements both over saved JSON files.

mod http;
pub mod jira;
pub mod snapshot;
pub mod tempo;

use std::future::Future;

use serde::Serialize;

use crate::error::Result;
use crate::types::{DateRange, Issue, Worklog};

pub use jira::{JiraClient, JiraUser};
pub use snapshot::SnapshotSource;
pub use tempo::TempoClient;

/// Provides the issues of a project.
pub trait IssueSource {
    fn issues(&self, project_key: &str) -> impl Future<Output = Result<Vec<Issue>>> + Send;
}

/// Provides the worklogs of a project, optionally restricted to a date range.
pub trait WorklogSource {
    fn worklogs(
        &self,
        project_key: &str,
        range: DateRange,
    ) -> impl Future<Output = Result<Vec<Worklog>>> + Send;
}

/// Everything a project report is computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectSnapshot {
    pub project_key: String,
    pub issues: Vec<Issue>,
    pub worklogs: Vec<Worklog>,
}

/// Loads project snapshots from a pair of sources.
pub struct Dashboard<I, W> {
    issues: I,
    worklogs: W,
}

impl<I: IssueSource, W: WorklogSource> Dashboard<I, W> {
    pub fn new(issues: I, worklogs: W) -> Self {
        Self { issues, worklogs }
    }

    /// Fetch issues and worklogs concurrently.
    ///
    /// Both fetches run to completion; the first error is returned.
    pub async fn load(&self, project_key: &str, range: DateRange) -> Result<ProjectSnapshot> {
        let (issues, worklogs) = tokio::join!(
            self.issues.issues(project_key),
            self.worklogs.worklogs(project_key, range)
        );
        let issues = issues?;
        let worklogs = worklogs?;
        tracing::info!(
            project = project_key,
            issues = issues.len(),
            worklogs = worklogs.len(),
            "Loaded project snapshot"
        );
        Ok(ProjectSnapshot {
            project_key: project_key.to_string(),
            issues,
            worklogs,
        })
    }
}

/// Source that has nothing to offer, for projects without linked credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct Empty;

impl IssueSource for Empty {
    async fn issues(&self, _project_key: &str) -> Result<Vec<Issue>> {
        Ok(Vec::new())
    }
}

impl WorklogSource for Empty {
    async fn worklogs(&self, _project_key: &str, _range: DateRange) -> Result<Vec<Worklog>> {
        Ok(Vec::new())
    }
}
