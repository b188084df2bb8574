//! Jira Cloud issue source.

use serde::Deserialize;

use super::http::{Auth, HttpClient};
use super::IssueSource;
use crate::config::{FetchConfig, JiraConfig};
use crate::error::Result;
use crate::ingest::{normalize_issues, JiraSearchResponse};
use crate::types::Issue;

/// Issue types fetched for the schedule.
pub const ISSUE_TYPES: &[&str] = &["Epic", "Story", "Task", "Sub-task"];

/// Current user as returned by `/rest/api/3/myself`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JiraClient {
    http: HttpClient,
    start_date_field: String,
    page_size: usize,
}

impl JiraClient {
    pub fn new(config: &JiraConfig, fetch: &FetchConfig) -> Result<Self> {
        config.validate()?;
        let auth = Auth::Basic {
            user: config.email.clone(),
            token: config.api_token.clone(),
        };
        Ok(Self {
            http: HttpClient::new("jira", &config.base_url, auth, fetch)?,
            start_date_field: config.start_date_field.clone(),
            page_size: fetch.jira_page_size,
        })
    }

    /// Verify the credentials by fetching the current user.
    pub async fn myself(&self) -> Result<JiraUser> {
        self.http
            .get_json(&self.http.url("/rest/api/3/myself"), &[])
            .await
    }

    /// Fetch every schedulable issue of a project, following pagination.
    pub async fn search_issues(&self, project_key: &str) -> Result<Vec<Issue>> {
        let url = self.http.url("/rest/api/3/search");
        let jql = project_jql(project_key);
        let fields = search_fields(&self.start_date_field);

        let mut issues = Vec::new();
        let mut start_at = 0usize;
        loop {
            let query = [
                ("jql", jql.clone()),
                ("startAt", start_at.to_string()),
                ("maxResults", self.page_size.to_string()),
                ("fields", fields.clone()),
            ];
            let page: JiraSearchResponse = self.http.get_json(&url, &query).await?;
            let received = page.issues.len();
            tracing::debug!(
                project = project_key,
                start_at,
                received,
                total = page.total,
                "Fetched Jira search page"
            );
            issues.extend(normalize_issues(page.issues, &self.start_date_field));

            let max_results = if page.max_results > 0 { page.max_results } else { self.page_size };
            start_at = page.start_at + max_results;
            if start_at >= page.total || received == 0 {
                break;
            }
        }

        tracing::info!(project = project_key, count = issues.len(), "Loaded Jira issues");
        Ok(issues)
    }
}

impl IssueSource for JiraClient {
    async fn issues(&self, project_key: &str) -> Result<Vec<Issue>> {
        self.search_issues(project_key).await
    }
}

/// JQL selecting the project's schedulable issues in a stable order.
pub fn project_jql(project_key: &str) -> String {
    format!(
        "project = \"{}\" AND issuetype in ({}) ORDER BY issuetype ASC, key ASC",
        project_key.replace('"', "\\\""),
        ISSUE_TYPES.join(", ")
    )
}

pub fn search_fields(start_date_field: &str) -> String {
    [
        "summary",
        "status",
        "issuetype",
        "parent",
        "duedate",
        start_date_field,
        "assignee",
        "timeoriginalestimate",
    ]
    .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_project_jql() {
        assert_eq!(
            project_jql("ACME"),
            "project = \"ACME\" AND issuetype in (Epic, Story, Task, Sub-task) ORDER BY issuetype ASC, key ASC"
        );
    }

    #[test]
    fn test_search_fields_include_start_field() {
        let fields = search_fields("customfield_10020");
        assert!(fields.contains(",customfield_10020,"));
        assert!(fields.ends_with("timeoriginalestimate"));
    }

    #[test]
    fn test_new_validates_config() {
        let config = JiraConfig {
            base_url: String::new(),
            email: "bot@acme.io".into(),
            api_token: "t".into(),
            start_date_field: "customfield_10015".into(),
        };
        assert!(matches!(
            JiraClient::new(&config, &FetchConfig::default()),
            Err(Error::Config(_))
        ));
    }
}
