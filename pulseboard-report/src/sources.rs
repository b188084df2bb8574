//! Pick live or snapshot sources for the selected project.

use anyhow::{Context, Result};
use pulseboard_core::config::{FetchConfig, ProjectConfig, DEFAULT_START_DATE_FIELD};
use pulseboard_core::source::{
    Empty, IssueSource, JiraClient, SnapshotSource, TempoClient, WorklogSource,
};
use pulseboard_core::{Config, DateRange, Issue, Worklog};
use serde::Serialize;

use crate::Cli;

/// Project key used when reading snapshots without a configured project.
const LOCAL_PROJECT: &str = "LOCAL";

pub enum Issues {
    Jira(JiraClient),
    Snapshot(SnapshotSource),
    Unlinked,
}

impl IssueSource for Issues {
    async fn issues(&self, project_key: &str) -> pulseboard_core::Result<Vec<Issue>> {
        match self {
            Issues::Jira(client) => client.issues(project_key).await,
            Issues::Snapshot(source) => source.issues(project_key).await,
            Issues::Unlinked => {
                tracing::warn!(project = project_key, "No Jira credentials linked");
                Empty.issues(project_key).await
            }
        }
    }
}

pub enum Worklogs {
    Tempo(TempoClient),
    Snapshot(SnapshotSource),
    Unlinked,
}

impl WorklogSource for Worklogs {
    async fn worklogs(
        &self,
        project_key: &str,
        range: DateRange,
    ) -> pulseboard_core::Result<Vec<Worklog>> {
        match self {
            Worklogs::Tempo(client) => client.worklogs(project_key, range).await,
            Worklogs::Snapshot(source) => source.worklogs(project_key, range).await,
            Worklogs::Unlinked => {
                tracing::warn!(project = project_key, "No Tempo credentials linked");
                Empty.worklogs(project_key, range).await
            }
        }
    }
}

pub struct Sources {
    pub project_key: String,
    pub issues: Issues,
    pub worklogs: Worklogs,
}

impl Sources {
    /// Snapshot files win over configured credentials.
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        if cli.issues.is_some() || cli.worklogs.is_some() {
            let project = cli
                .project
                .as_deref()
                .and_then(|name| config.project(name).ok());
            let project_key = project
                .map(|p| p.jira_project_key.clone())
                .or_else(|| cli.project.clone())
                .unwrap_or_else(|| LOCAL_PROJECT.to_string());
            let start_date_field = project
                .and_then(|p| p.jira.as_ref())
                .map(|j| j.start_date_field.clone())
                .unwrap_or_else(|| DEFAULT_START_DATE_FIELD.to_string());

            let snapshot = SnapshotSource::new(cli.issues.clone(), cli.worklogs.clone())
                .with_start_date_field(start_date_field);
            return Ok(Self {
                project_key,
                issues: Issues::Snapshot(snapshot.clone()),
                worklogs: Worklogs::Snapshot(snapshot),
            });
        }

        let project = select_project(cli, config)?.context(
            "no project selected; pass --project, or --issues/--worklogs to read snapshots",
        )?;

        let issues = match &project.jira {
            Some(jira) => Issues::Jira(
                JiraClient::new(jira, &config.fetch).context("invalid Jira configuration")?,
            ),
            None => Issues::Unlinked,
        };
        let worklogs = match &project.tempo {
            Some(tempo) => Worklogs::Tempo(
                TempoClient::new(tempo, &config.fetch).context("invalid Tempo configuration")?,
            ),
            None => Worklogs::Unlinked,
        };

        Ok(Self {
            project_key: project.jira_project_key.clone(),
            issues,
            worklogs,
        })
    }
}

/// The project named on the command line, or the only configured one.
pub fn select_project<'a>(cli: &Cli, config: &'a Config) -> Result<Option<&'a ProjectConfig>> {
    match cli.project.as_deref() {
        Some(name) => Ok(Some(config.project(name)?)),
        None if config.projects.len() == 1 => Ok(config.projects.first()),
        None => Ok(None),
    }
}

/// Outcome of probing one service.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ServiceCheck {
    NotConfigured,
    Ok { detail: String },
    Failed { error: String },
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub project: String,
    pub jira: ServiceCheck,
    pub tempo: ServiceCheck,
}

impl CheckReport {
    pub fn failed(&self) -> bool {
        matches!(self.jira, ServiceCheck::Failed { .. })
            || matches!(self.tempo, ServiceCheck::Failed { .. })
    }
}

/// Probe both services concurrently.
pub async fn check_connections(project: &ProjectConfig, fetch: &FetchConfig) -> CheckReport {
    let jira = async {
        let Some(jira) = &project.jira else {
            return ServiceCheck::NotConfigured;
        };
        let result = match JiraClient::new(jira, fetch) {
            Ok(client) => client.myself().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(user) => ServiceCheck::Ok {
                detail: format!(
                    "connected as {}",
                    user.display_name.as_deref().unwrap_or("unknown user")
                ),
            },
            Err(e) => ServiceCheck::Failed { error: e.to_string() },
        }
    };
    let tempo = async {
        let Some(tempo) = &project.tempo else {
            return ServiceCheck::NotConfigured;
        };
        let result = match TempoClient::new(tempo, fetch) {
            Ok(client) => client.check().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => ServiceCheck::Ok {
                detail: "token accepted".to_string(),
            },
            Err(e) => ServiceCheck::Failed { error: e.to_string() },
        }
    };

    let (jira, tempo) = tokio::join!(jira, tempo);
    CheckReport {
        project: project.name.clone(),
        jira,
        tempo,
    }
}
