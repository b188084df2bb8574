//! Shared HTTP plumbing for the Jira and Tempo clients.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::config::FetchConfig;
use crate::error::{Error, Result};

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// How requests authenticate.
#[derive(Clone)]
pub(crate) enum Auth {
    Basic { user: String, token: String },
    Bearer(String),
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Auth::Basic { user, .. } => write!(f, "Basic({}, ***)", user),
            Auth::Bearer(_) => write!(f, "Bearer(***)"),
        }
    }
}

/// JSON-over-HTTP client with retry on transient failures.
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    service: &'static str,
    base_url: String,
    auth: Auth,
    max_retries: usize,
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(service: &'static str, base_url: &str, auth: Auth, fetch: &FetchConfig) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config(format!("{} base_url is required", service)));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            service,
            base_url,
            auth,
            max_retries: fetch.max_retries,
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, url: &str, query: &[(&str, String)]) -> RequestBuilder {
        let request = self.client.get(url).query(query);
        match &self.auth {
            Auth::Basic { user, token } => request.basic_auth(user, Some(token)),
            Auth::Bearer(token) => request.bearer_auth(token),
        }
    }

    async fn get_json_once<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.get(url, query).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            Err(Error::Api {
                service: self.service,
                status: status.as_u16(),
                body,
            })
        }
    }

    /// GET and decode JSON, retrying transient failures with exponential backoff.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let mut last_error = None;
        let mut delay = INITIAL_BACKOFF;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tracing::debug!(
                    service = self.service,
                    "Retrying {} (attempt {}/{}), waiting {:?}",
                    url,
                    attempt + 1,
                    self.max_retries + 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay = next_backoff(delay);
            }

            match self.get_json_once(url, query).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    tracing::warn!(service = self.service, "Transient error fetching {}: {}", url, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::Payload(format!("{}: max retries exceeded", self.service))
        }))
    }
}

fn next_backoff(delay: Duration) -> Duration {
    std::cmp::min(delay * 2, MAX_BACKOFF)
}
