//! Monthly time pivot: resolved author × calendar month.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::format::format_cell;
use crate::types::Worklog;

/// Number of months shown when no window length is given.
pub const DEFAULT_PIVOT_MONTHS: u32 = 4;

/// A single calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MonthWindow {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl MonthWindow {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Last day of the month.
    pub fn end(&self) -> Option<NaiveDate> {
        self.next().start()?.pred_opt()
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Display label, e.g. "Mar 2024".
    pub fn label(&self) -> String {
        self.start()
            .map(|d| d.format("%b %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month))
    }

    /// Whether an ISO `YYYY-MM-DD` string falls inside this month.
    pub fn contains_iso(&self, date: &str) -> bool {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => {
                let start = start.format("%Y-%m-%d").to_string();
                let end = end.format("%Y-%m-%d").to_string();
                start.as_str() <= date && date <= end.as_str()
            }
            _ => false,
        }
    }

    /// `count` consecutive months ending with the month containing `today`,
    /// oldest first.
    pub fn trailing(today: NaiveDate, count: u32) -> Vec<Self> {
        let mut months = Vec::with_capacity(count as usize);
        let mut month = Self::containing(today);
        for _ in 0..count {
            months.push(month);
            month = month.previous();
        }
        months.reverse();
        months
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotRow {
    pub author: String,
    /// Seconds per month, aligned with [`MonthlyPivot::months`]; `None` when
    /// the author logged nothing that month
    pub cells: Vec<Option<u64>>,
    pub total_seconds: u64,
}

impl PivotRow {
    pub fn display_cells(&self) -> Vec<String> {
        self.cells.iter().map(|c| format_cell(*c)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPivot {
    pub months: Vec<MonthWindow>,
    /// Sorted alphabetically by author
    pub rows: Vec<PivotRow>,
    pub column_totals: Vec<u64>,
    pub grand_total: u64,
}

impl MonthlyPivot {
    pub fn labels(&self) -> Vec<String> {
        self.months.iter().map(MonthWindow::label).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pivot over the default four-month window ending at `today`.
pub fn monthly_pivot(worklogs: &[Worklog], today: NaiveDate) -> MonthlyPivot {
    monthly_pivot_for(worklogs, today, DEFAULT_PIVOT_MONTHS)
}

/// Pivot over `months` calendar months ending with the month of `today`.
///
/// Worklogs with no resolvable author, or dated outside the window, are
/// left out entirely.
pub fn monthly_pivot_for(worklogs: &[Worklog], today: NaiveDate, months: u32) -> MonthlyPivot {
    let months = MonthWindow::trailing(today, months);
    let mut by_author: BTreeMap<String, Vec<Option<u64>>> = BTreeMap::new();

    for worklog in worklogs {
        let Some(author) = worklog.resolved_author() else {
            continue;
        };
        let Some(index) = months.iter().position(|m| m.contains_iso(&worklog.start_date)) else {
            continue;
        };
        let cells = by_author
            .entry(author.to_string())
            .or_insert_with(|| vec![None; months.len()]);
        let cell = cells[index].get_or_insert(0);
        *cell += worklog.time_spent_seconds;
    }

    let mut rows: Vec<PivotRow> = by_author
        .into_iter()
        .map(|(author, cells)| PivotRow {
            total_seconds: cells.iter().flatten().sum(),
            author,
            cells,
        })
        .collect();
    rows.sort_by(|a, b| crate::table::collate(&a.author, &b.author));

    let column_totals: Vec<u64> = (0..months.len())
        .map(|i| rows.iter().filter_map(|r| r.cells[i]).sum())
        .collect();
    let grand_total = column_totals.iter().sum();

    MonthlyPivot {
        months,
        rows,
        column_totals,
        grand_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::NO_DATA;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn log(author: Option<&str>, assignee: Option<&str>, seconds: u64, date: &str) -> Worklog {
        Worklog {
            id: None,
            issue_key: "ACME-1".to_string(),
            issue_summary: "Work".to_string(),
            author: author.map(String::from),
            assignee: assignee.map(String::from),
            time_spent_seconds: seconds,
            start_date: date.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_month_window_navigation() {
        let jan = MonthWindow { year: 2024, month: 1 };
        assert_eq!(jan.previous(), MonthWindow { year: 2023, month: 12 });
        assert_eq!(jan.previous().next(), jan);
        assert_eq!(jan.end(), Some(ymd(2024, 1, 31)));
        assert_eq!(MonthWindow { year: 2024, month: 2 }.end(), Some(ymd(2024, 2, 29)));
        assert_eq!(jan.label(), "Jan 2024");
    }

    #[test]
    fn test_trailing_crosses_year() {
        let months = MonthWindow::trailing(ymd(2024, 2, 15), 4);
        let labels: Vec<String> = months.iter().map(MonthWindow::label).collect();
        assert_eq!(labels, vec!["Nov 2023", "Dec 2023", "Jan 2024", "Feb 2024"]);
    }

    #[test]
    fn test_pivot_buckets_and_marker() {
        let worklogs = vec![
            log(Some("Bob"), None, 3600, "2024-03-31"),
            log(Some("Bob"), None, 1800, "2024-03-01"),
            log(Some("Alice"), None, 7200, "2024-01-15"),
            log(Some("Unknown"), Some("Carol"), 3600, "2024-02-10"),
            log(None, None, 3600, "2024-02-10"),
            log(Some("Alice"), None, 3600, "2023-11-30"),
            log(Some("Alice"), None, 3600, ""),
        ];
        let pivot = monthly_pivot(&worklogs, ymd(2024, 3, 20));

        assert_eq!(pivot.labels(), vec!["Dec 2023", "Jan 2024", "Feb 2024", "Mar 2024"]);
        let authors: Vec<&str> = pivot.rows.iter().map(|r| r.author.as_str()).collect();
        assert_eq!(authors, vec!["Alice", "Bob", "Carol"]);

        let bob = &pivot.rows[1];
        assert_eq!(bob.cells, vec![None, None, None, Some(5400)]);
        assert_eq!(bob.total_seconds, 5400);
        assert_eq!(bob.display_cells(), vec![NO_DATA, NO_DATA, NO_DATA, "2h"]);

        assert_eq!(pivot.column_totals, vec![0, 7200, 3600, 5400]);
        assert_eq!(pivot.grand_total, 16200);
    }

    #[test]
    fn test_zero_cell_renders_marker() {
        let worklogs = vec![log(Some("Ada"), None, 0, "2024-03-02")];
        let pivot = monthly_pivot_for(&worklogs, ymd(2024, 3, 2), 1);
        assert_eq!(pivot.rows[0].cells, vec![Some(0)]);
        assert_eq!(pivot.rows[0].display_cells(), vec![NO_DATA]);
    }

    #[test]
    fn test_empty_pivot() {
        let pivot = monthly_pivot(&[], ymd(2024, 3, 2));
        assert!(pivot.is_empty());
        assert_eq!(pivot.months.len(), 4);
        assert_eq!(pivot.grand_total, 0);
    }
}
