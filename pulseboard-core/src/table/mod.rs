//! Filter, sort, group and paginate worklog collections.
//!
//! Every view is recomputed from the full worklog slice; nothing is cached
//! between calls.

pub mod export;

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{DateRange, Worklog};

pub use export::{to_csv_string, write_csv, CSV_HEADER};

/// Rows per page of the ungrouped table.
pub const PAGE_SIZE: usize = 25;

/// Bucket name used when grouping is off.
pub const ALL_WORKLOGS: &str = "All Worklogs";
/// Bucket name for worklogs whose key has no prefix.
pub const OTHER_GROUP: &str = "Other";
/// Bucket name for worklogs with no resolvable author.
pub const UNASSIGNED_GROUP: &str = "Unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    IssueKey,
    Author,
    TimeSpentSeconds,
    StartDate,
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "issue_key" | "key" => Ok(SortField::IssueKey),
            "author" => Ok(SortField::Author),
            "time_spent_seconds" | "time" | "hours" => Ok(SortField::TimeSpentSeconds),
            "start_date" | "date" => Ok(SortField::StartDate),
            _ => Err(format!("unknown sort field: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    None,
    /// Issue key prefix before the first "-"
    Epic,
    /// Resolved author
    Assignee,
}

impl std::str::FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(GroupBy::None),
            "epic" => Ok(GroupBy::Epic),
            "assignee" | "author" => Ok(GroupBy::Assignee),
            _ => Err(format!("unknown grouping: {}", s)),
        }
    }
}

/// Declarative worklog table view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorklogQuery {
    /// Case-insensitive substring over issue key, summary and author
    #[serde(default)]
    pub search: Option<String>,
    /// Inclusive range checked against the ISO `start_date` string
    #[serde(default)]
    pub range: DateRange,
    #[serde(default)]
    pub sort: Option<(SortField, SortDir)>,
    #[serde(default)]
    pub group_by: GroupBy,
}

impl WorklogQuery {
    pub fn matches(&self, worklog: &Worklog) -> bool {
        self.matches_search(worklog) && self.range.contains_iso(&worklog.start_date)
    }

    fn matches_search(&self, worklog: &Worklog) -> bool {
        let needle = match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };
        worklog.issue_key.to_lowercase().contains(&needle)
            || worklog.issue_summary.to_lowercase().contains(&needle)
            || worklog
                .author
                .as_deref()
                .is_some_and(|a| a.to_lowercase().contains(&needle))
    }

    /// Matching worklogs, stably sorted.
    pub fn filter_sort<'a>(&self, worklogs: &'a [Worklog]) -> Vec<&'a Worklog> {
        let mut rows: Vec<&Worklog> = worklogs.iter().filter(|w| self.matches(w)).collect();
        if let Some((field, dir)) = self.sort {
            rows.sort_by(|a, b| {
                let ord = compare_by(a, b, field);
                match dir {
                    SortDir::Asc => ord,
                    SortDir::Desc => ord.reverse(),
                }
            });
        }
        rows
    }

    /// Filtered, sorted rows split into named buckets.
    ///
    /// Buckets are ordered alphabetically; rows keep their sorted order
    /// inside each bucket.
    pub fn groups<'a>(&self, worklogs: &'a [Worklog]) -> Vec<WorklogGroup<'a>> {
        let rows = self.filter_sort(worklogs);
        if self.group_by == GroupBy::None {
            return vec![WorklogGroup::new(ALL_WORKLOGS.to_string(), rows)];
        }

        let mut buckets: BTreeMap<CollatedKey, Vec<&'a Worklog>> = BTreeMap::new();
        for row in rows {
            let name = group_name(row, self.group_by);
            buckets.entry(CollatedKey(name)).or_default().push(row);
        }
        buckets
            .into_iter()
            .map(|(CollatedKey(name), rows)| WorklogGroup::new(name, rows))
            .collect()
    }

    /// One page of the ungrouped table. Out-of-range pages clamp to the last.
    pub fn page<'a>(&self, worklogs: &'a [Worklog], index: usize) -> Page<'a> {
        paginate(self.filter_sort(worklogs), index)
    }
}

/// Bucket of worklogs sharing a group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorklogGroup<'a> {
    pub name: String,
    pub total_seconds: u64,
    pub rows: Vec<&'a Worklog>,
}

impl<'a> WorklogGroup<'a> {
    fn new(name: String, rows: Vec<&'a Worklog>) -> Self {
        Self {
            name,
            total_seconds: total_seconds(rows.iter().copied()),
            rows,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<'a> {
    /// 0-based, after clamping
    pub index: usize,
    /// At least 1
    pub total_pages: usize,
    pub total_rows: usize,
    pub rows: Vec<&'a Worklog>,
    pub has_prev: bool,
    pub has_next: bool,
}

pub fn paginate<'a>(rows: Vec<&'a Worklog>, index: usize) -> Page<'a> {
    let total_rows = rows.len();
    let total_pages = total_rows.div_ceil(PAGE_SIZE).max(1);
    let index = index.min(total_pages - 1);
    let rows = rows
        .into_iter()
        .skip(index * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    Page {
        index,
        total_pages,
        total_rows,
        rows,
        has_prev: index > 0,
        has_next: index + 1 < total_pages,
    }
}

pub fn total_seconds<'a>(worklogs: impl IntoIterator<Item = &'a Worklog>) -> u64 {
    worklogs.into_iter().map(|w| w.time_spent_seconds).sum()
}

fn group_name(worklog: &Worklog, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::None => ALL_WORKLOGS.to_string(),
        GroupBy::Epic => match worklog.key_prefix() {
            "" => OTHER_GROUP.to_string(),
            prefix => prefix.to_string(),
        },
        GroupBy::Assignee => worklog
            .author
            .as_deref()
            .map(str::trim)
            .filter(|author| !author.is_empty())
            .unwrap_or(UNASSIGNED_GROUP)
            .to_string(),
    }
}

fn compare_by(a: &Worklog, b: &Worklog, field: SortField) -> Ordering {
    match field {
        SortField::IssueKey => collate(&a.issue_key, &b.issue_key),
        SortField::Author => collate(
            a.author.as_deref().unwrap_or_default(),
            b.author.as_deref().unwrap_or_default(),
        ),
        SortField::TimeSpentSeconds => a.time_spent_seconds.cmp(&b.time_spent_seconds),
        SortField::StartDate => collate(&a.start_date, &b.start_date),
    }
}

/// Case-insensitive comparison with an exact tie-break.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Map key ordered by [`collate`].
#[derive(Debug, PartialEq, Eq)]
struct CollatedKey(String);

impl Ord for CollatedKey {
    fn cmp(&self, other: &Self) -> Ordering {
        collate(&self.0, &other.0)
    }
}

impl PartialOrd for CollatedKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
