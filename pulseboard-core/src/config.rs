//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/pulseboard/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/pulseboard/` (~/.config/pulseboard/)
//! - State/Logs: `$XDG_STATE_HOME/pulseboard/` (~/.local/state/pulseboard/)
//!
//! Each `[[projects]]` entry links a client-facing project to the Jira
//! project key and the Jira/Tempo credentials used to fetch its data.

use crate::error::{Error, Result};
use crate::timeline::Zoom;
use chrono::Weekday;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default custom field holding an issue's start date in Jira Cloud.
pub const DEFAULT_START_DATE_FIELD: &str = "customfield_10015";

/// Default Tempo REST endpoint.
pub const DEFAULT_TEMPO_BASE_URL: &str = "https://api.tempo.io/4";

/// Jira caps `maxResults` on search at this value.
pub const MAX_JIRA_PAGE_SIZE: usize = 100;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// HTTP fetch behaviour shared by the Jira and Tempo clients
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Gantt rendering defaults
    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Projects and their linked credentials
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Mirror log events to stderr as well as the log file
    #[serde(default)]
    pub stderr: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            stderr: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP fetch configuration
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Max retry attempts for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Issues requested per Jira search page (max 100)
    #[serde(default = "default_jira_page_size")]
    pub jira_page_size: usize,

    /// Worklogs requested per Tempo page
    #[serde(default = "default_tempo_page_size")]
    pub tempo_page_size: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            jira_page_size: default_jira_page_size(),
            tempo_page_size: default_tempo_page_size(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_jira_page_size() -> usize {
    MAX_JIRA_PAGE_SIZE
}

fn default_tempo_page_size() -> usize {
    1000
}

impl FetchConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.jira_page_size == 0 || self.jira_page_size > MAX_JIRA_PAGE_SIZE {
            return Err(Error::Config(format!(
                "fetch.jira_page_size must be between 1 and {}",
                MAX_JIRA_PAGE_SIZE
            )));
        }
        if self.tempo_page_size == 0 {
            return Err(Error::Config(
                "fetch.tempo_page_size must be greater than 0".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "fetch.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Gantt rendering defaults
#[derive(Debug, Deserialize)]
pub struct TimelineConfig {
    /// Default zoom level
    #[serde(default)]
    pub zoom: Zoom,

    /// Weekday that week ticks are anchored to
    #[serde(default = "default_week_start")]
    pub week_start: String,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            zoom: Zoom::default(),
            week_start: default_week_start(),
        }
    }
}

fn default_week_start() -> String {
    "monday".to_string()
}

impl TimelineConfig {
    /// Parse the configured week anchor.
    pub fn week_start(&self) -> Result<Weekday> {
        self.week_start.parse::<Weekday>().map_err(|_| {
            Error::Config(format!(
                "timeline.week_start is not a weekday: {}",
                self.week_start
            ))
        })
    }
}

/// A client-facing project linked to a Jira project
#[derive(Debug, Deserialize, Clone)]
pub struct ProjectConfig {
    /// Display name
    pub name: String,
    /// Jira project key (e.g. "ACME")
    pub jira_project_key: String,
    /// Optional description
    pub description: Option<String>,
    /// Jira credentials (optional until an admin links them)
    pub jira: Option<JiraConfig>,
    /// Tempo credentials (optional)
    pub tempo: Option<TempoConfig>,
}

impl ProjectConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.jira_project_key.trim().is_empty() {
            return Err(Error::Config(format!(
                "project '{}' has an empty jira_project_key",
                self.name
            )));
        }
        if let Some(jira) = &self.jira {
            jira.validate()?;
        }
        if let Some(tempo) = &self.tempo {
            if tempo.api_token.trim().is_empty() {
                return Err(Error::Config(format!(
                    "project '{}' has an empty tempo.api_token",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Check if the name or Jira key matches, ignoring case.
    pub fn matches(&self, name_or_key: &str) -> bool {
        self.name.eq_ignore_ascii_case(name_or_key)
            || self.jira_project_key.eq_ignore_ascii_case(name_or_key)
    }
}

/// Jira Cloud credentials
#[derive(Debug, Deserialize, Clone)]
pub struct JiraConfig {
    /// Site URL (e.g., `https://acme.atlassian.net`)
    pub base_url: String,
    /// Account email used for basic auth
    pub email: String,
    /// API token used for basic auth
    pub api_token: String,
    /// Custom field id holding the issue start date
    #[serde(default = "default_start_date_field")]
    pub start_date_field: String,
}

fn default_start_date_field() -> String {
    DEFAULT_START_DATE_FIELD.to_string()
}

impl JiraConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("jira.base_url is required".to_string()));
        }
        if self.email.trim().is_empty() || self.api_token.trim().is_empty() {
            return Err(Error::Config(
                "jira.email and jira.api_token are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Tempo credentials
#[derive(Debug, Deserialize, Clone)]
pub struct TempoConfig {
    /// Bearer token
    pub api_token: String,
    /// API base URL
    #[serde(default = "default_tempo_base_url")]
    pub base_url: String,
}

fn default_tempo_base_url() -> String {
    DEFAULT_TEMPO_BASE_URL.to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.fetch.validate()?;
        self.timeline.week_start()?;
        for project in &self.projects {
            project.validate()?;
        }
        Ok(())
    }

    /// Find a project by display name or Jira key (case-insensitive).
    pub fn project(&self, name_or_key: &str) -> Result<&ProjectConfig> {
        self.projects
            .iter()
            .find(|p| p.matches(name_or_key))
            .ok_or_else(|| Error::ProjectNotFound(name_or_key.to_string()))
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/pulseboard/config.toml` (~/.config/pulseboard/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("pulseboard").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/pulseboard/` (~/.local/state/pulseboard/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("pulseboard")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("pulseboard.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[logging]
level = "debug"

[fetch]
timeout_secs = 10
max_retries = 1

[timeline]
zoom = "month"
week_start = "sunday"

[[projects]]
name = "Acme Portal"
jira_project_key = "ACME"
description = "Client portal rebuild"

[projects.jira]
base_url = "https://acme.atlassian.net"
email = "bot@acme.io"
api_token = "secret"

[projects.tempo]
api_token = "tempo-secret"

[[projects]]
name = "Internal"
jira_project_key = "INT"
"#;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.fetch.max_retries, 3);
        assert_eq!(config.fetch.jira_page_size, 100);
        assert_eq!(config.fetch.tempo_page_size, 1000);
        assert_eq!(config.timeline.zoom, Zoom::Week);
        assert_eq!(config.timeline.week_start().unwrap(), Weekday::Mon);
        assert!(config.projects.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.fetch.timeout_secs, 10);
        assert_eq!(config.fetch.jira_page_size, 100);
        assert_eq!(config.timeline.zoom, Zoom::Month);
        assert_eq!(config.timeline.week_start().unwrap(), Weekday::Sun);
        assert_eq!(config.projects.len(), 2);

        let acme = &config.projects[0];
        let jira = acme.jira.as_ref().unwrap();
        assert_eq!(jira.start_date_field, DEFAULT_START_DATE_FIELD);
        let tempo = acme.tempo.as_ref().unwrap();
        assert_eq!(tempo.base_url, DEFAULT_TEMPO_BASE_URL);
        assert!(config.projects[1].jira.is_none());
    }

    #[test]
    fn test_project_lookup() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.project("acme portal").unwrap().jira_project_key, "ACME");
        assert_eq!(config.project("int").unwrap().name, "Internal");
        assert!(matches!(
            config.project("missing"),
            Err(Error::ProjectNotFound(_))
        ));
    }

    #[test]
    fn test_fetch_config_validation() {
        assert!(FetchConfig::default().validate().is_ok());

        let config = FetchConfig {
            jira_page_size: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FetchConfig {
            tempo_page_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_week_start_rejected() {
        let config: Config = toml::from_str("[timeline]\nweek_start = \"someday\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let toml = r#"
[[projects]]
name = "Acme"
jira_project_key = "ACME"

[projects.jira]
base_url = "https://acme.atlassian.net"
email = ""
api_token = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.projects.len(), 2);

        std::fs::write(&path, "[fetch]\njira_page_size = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
