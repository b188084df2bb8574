//! Offline source reading issue and worklog JSON documents from disk.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{IssueSource, WorklogSource};
use crate::config::DEFAULT_START_DATE_FIELD;
use crate::error::Result;
use crate::ingest::{issues_from_value, worklogs_from_value};
use crate::types::{DateRange, Issue, Worklog};

/// Reads saved API responses.
///
/// Each file holds either a bare JSON array or an object wrapping the array
/// (`{"issues": [...]}` / `{"worklogs": [...]}`), in either payload family.
/// A missing path yields an empty collection.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    issues_path: Option<PathBuf>,
    worklogs_path: Option<PathBuf>,
    start_date_field: String,
}

impl SnapshotSource {
    pub fn new(issues_path: Option<PathBuf>, worklogs_path: Option<PathBuf>) -> Self {
        Self {
            issues_path,
            worklogs_path,
            start_date_field: DEFAULT_START_DATE_FIELD.to_string(),
        }
    }

    /// Custom field holding the start date in REST-shaped issue files.
    pub fn with_start_date_field(mut self, field: impl Into<String>) -> Self {
        self.start_date_field = field.into();
        self
    }

    pub fn load_issues(&self) -> Result<Vec<Issue>> {
        match &self.issues_path {
            Some(path) => issues_from_value(read_json(path)?, &self.start_date_field),
            None => Ok(Vec::new()),
        }
    }

    /// Worklogs from the file, restricted to `range`.
    pub fn load_worklogs(&self, range: DateRange) -> Result<Vec<Worklog>> {
        let worklogs = match &self.worklogs_path {
            Some(path) => worklogs_from_value(read_json(path)?)?,
            None => Vec::new(),
        };
        Ok(worklogs
            .into_iter()
            .filter(|w| range.is_open() || range.contains_iso(&w.start_date))
            .collect())
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    tracing::debug!(path = %path.display(), "Read snapshot");
    Ok(value)
}

impl IssueSource for SnapshotSource {
    async fn issues(&self, _project_key: &str) -> Result<Vec<Issue>> {
        self.load_issues()
    }
}

impl WorklogSource for SnapshotSource {
    async fn worklogs(&self, _project_key: &str, range: DateRange) -> Result<Vec<Worklog>> {
        self.load_worklogs(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_reads_wrapped_and_bare_documents() {
        let dir = TempDir::new().unwrap();
        let issues = write(
            &dir,
            "issues.json",
            r#"{"issues": [{"key": "A-1", "summary": "One", "issueType": "Epic"}]}"#,
        );
        let worklogs = write(
            &dir,
            "worklogs.json",
            r#"[{"issueKey": "A-1", "timeSpentSeconds": 60, "startDate": "2024-03-01"},
                {"issueKey": "A-1", "timeSpentSeconds": 60, "startDate": "2024-04-01"}]"#,
        );
        let source = SnapshotSource::new(Some(issues), Some(worklogs));

        assert_eq!(source.load_issues().unwrap()[0].key, "A-1");
        assert_eq!(source.load_worklogs(DateRange::default()).unwrap().len(), 2);

        let march = DateRange::new(NaiveDate::from_ymd_opt(2024, 3, 1), NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(source.load_worklogs(march).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_paths_are_empty() {
        let source = SnapshotSource::default();
        assert!(source.load_issues().unwrap().is_empty());
        assert!(source.load_worklogs(DateRange::default()).unwrap().is_empty());
    }

    #[test]
    fn test_bad_files_error() {
        let dir = TempDir::new().unwrap();
        let garbage = write(&dir, "issues.json", "not json");
        let source = SnapshotSource::new(Some(garbage), Some(dir.path().join("absent.json")));
        assert!(matches!(source.load_issues(), Err(Error::Json(_))));
        assert!(matches!(source.load_worklogs(DateRange::default()), Err(Error::Io(_))));
    }
}
