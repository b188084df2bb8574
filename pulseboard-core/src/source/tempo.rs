//! Tempo worklog source.

use serde_json::Value;

use super::http::{Auth, HttpClient};
use super::WorklogSource;
use crate::config::{FetchConfig, TempoConfig};
use crate::error::Result;
use crate::ingest::{normalize_worklogs, TempoPage};
use crate::types::{DateRange, Worklog};

#[derive(Debug, Clone)]
pub struct TempoClient {
    http: HttpClient,
    page_size: usize,
}

impl TempoClient {
    pub fn new(config: &TempoConfig, fetch: &FetchConfig) -> Result<Self> {
        let auth = Auth::Bearer(config.api_token.clone());
        Ok(Self {
            http: HttpClient::new("tempo", &config.base_url, auth, fetch)?,
            page_size: fetch.tempo_page_size,
        })
    }

    /// Verify the token against `/accounts`.
    pub async fn check(&self) -> Result<()> {
        let _: Value = self.http.get_json(&self.http.url("/accounts"), &[]).await?;
        Ok(())
    }

    /// Fetch all worklogs of a project, following offset pagination until
    /// the response carries no `next` link.
    pub async fn project_worklogs(&self, project_key: &str, range: DateRange) -> Result<Vec<Worklog>> {
        let url = self.http.url(&format!(
            "/worklogs/project/{}",
            urlencoding::encode(project_key)
        ));

        let mut worklogs = Vec::new();
        let mut offset = 0usize;
        loop {
            let query = page_query(offset, self.page_size, range);
            let page: TempoPage = self.http.get_json(&url, &query).await?;
            let received = page.results.len();
            tracing::debug!(project = project_key, offset, received, "Fetched Tempo page");
            worklogs.extend(normalize_worklogs(page.results));

            if page.metadata.next.is_none() || received == 0 {
                break;
            }
            offset += received;
        }

        tracing::info!(project = project_key, count = worklogs.len(), "Loaded Tempo worklogs");
        Ok(worklogs)
    }
}

impl WorklogSource for TempoClient {
    async fn worklogs(&self, project_key: &str, range: DateRange) -> Result<Vec<Worklog>> {
        self.project_worklogs(project_key, range).await
    }
}

fn page_query(offset: usize, limit: usize, range: DateRange) -> Vec<(&'static str, String)> {
    let mut query = vec![("limit", limit.to_string()), ("offset", offset.to_string())];
    if let Some(from) = range.from {
        query.push(("from", from.format("%Y-%m-%d").to_string()));
    }
    if let Some(to) = range.to {
        query.push(("to", to.format("%Y-%m-%d").to_string()));
    }
    query
}
