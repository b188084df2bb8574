//! Time-scaled Gantt geometry.
//!
//! Maps hierarchy rows onto a shared date domain. Geometry is expressed in
//! abstract pixels (`px_per_day` from the zoom level) and in percentages of
//! the domain width; no drawing primitives leave this module.

use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::hierarchy::HierarchyRow;
use crate::format::format_date;
use crate::types::Issue;

/// Days of padding added on both sides of the scheduled date span.
pub const PADDING_DAYS: i64 = 3;

/// Window length used when no row is scheduled.
pub const FALLBACK_WINDOW_DAYS: i64 = 30;

/// Horizontal zoom granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zoom {
    Day,
    #[default]
    Week,
    Month,
}

impl Zoom {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zoom::Day => "day",
            Zoom::Week => "week",
            Zoom::Month => "month",
        }
    }

    pub fn px_per_day(&self) -> i64 {
        match self {
            Zoom::Day => 40,
            Zoom::Week => 16,
            Zoom::Month => 5,
        }
    }
}

impl std::str::FromStr for Zoom {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Zoom::Day),
            "week" => Ok(Zoom::Week),
            "month" => Ok(Zoom::Month),
            _ => Err(format!("unknown zoom level: {}", s)),
        }
    }
}

impl std::fmt::Display for Zoom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Inputs to [`scale_timeline`] besides the rows.
#[derive(Debug, Clone, Copy)]
pub struct TimelineOptions {
    pub zoom: Zoom,
    /// Anchor day for week ticks
    pub week_start: Weekday,
    /// Start of the fallback window when nothing is scheduled
    pub today: NaiveDate,
}

impl TimelineOptions {
    pub fn new(zoom: Zoom, today: NaiveDate) -> Self {
        Self {
            zoom,
            week_start: Weekday::Mon,
            today,
        }
    }
}

/// Shared date domain of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateDomain {
    pub min: NaiveDate,
    pub max: NaiveDate,
    /// Always at least 1
    pub total_days: i64,
}

impl DateDomain {
    /// Domain covering every date of the scheduled issues, padded outward.
    ///
    /// Falls back to a window starting at `today` when there are none.
    pub fn from_scheduled<'a>(issues: impl IntoIterator<Item = &'a Issue>, today: NaiveDate) -> Self {
        let bounds = issues
            .into_iter()
            .filter_map(|issue| Some((issue.start_date?, issue.due_date?)))
            .flat_map(|(start, due)| [start, due])
            .fold(None, |acc: Option<(NaiveDate, NaiveDate)>, date| match acc {
                None => Some((date, date)),
                Some((min, max)) => Some((min.min(date), max.max(date))),
            });

        match bounds {
            Some((min, max)) => {
                let min = min - Duration::days(PADDING_DAYS);
                let max = max + Duration::days(PADDING_DAYS);
                Self {
                    min,
                    max,
                    total_days: (max - min).num_days().max(1),
                }
            }
            None => Self {
                min: today,
                max: today + Duration::days(FALLBACK_WINDOW_DAYS),
                total_days: FALLBACK_WINDOW_DAYS,
            },
        }
    }

    pub fn offset_days(&self, date: NaiveDate) -> i64 {
        (date - self.min).num_days()
    }

    pub fn pct(&self, days: i64) -> f64 {
        days as f64 / self.total_days as f64 * 100.0
    }
}

/// Bar geometry for a scheduled row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    pub start_offset_days: i64,
    /// At least 1, so same-day issues stay visible
    pub duration_days: i64,
    pub left_px: i64,
    pub width_px: i64,
    pub left_pct: f64,
    /// Clipped so the bar never runs past the right edge
    pub width_pct: f64,
}

impl Bar {
    fn new(start: NaiveDate, due: NaiveDate, domain: &DateDomain, px_per_day: i64) -> Self {
        let start_offset_days = domain.offset_days(start);
        let duration_days = (due - start).num_days().max(1);
        let left_pct = domain.pct(start_offset_days);
        let width_pct = domain.pct(duration_days).min(100.0 - left_pct);

        Self {
            start_offset_days,
            duration_days,
            left_px: start_offset_days * px_per_day,
            width_px: duration_days * px_per_day,
            left_pct,
            width_pct,
        }
    }
}

/// Detail shown when hovering a row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub key: String,
    pub summary: String,
    /// Status category label, e.g. "in progress"
    pub status: String,
    pub assignee: Option<String>,
    pub start: Option<String>,
    pub due: Option<String>,
}

impl Tooltip {
    pub fn for_issue(issue: &Issue) -> Self {
        Self {
            key: issue.key.clone(),
            summary: issue.summary.clone(),
            status: issue.status_category.label(),
            assignee: issue.assignee.clone(),
            start: issue.start_date.map(format_date),
            due: issue.due_date.map(format_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow<'a> {
    pub issue: &'a Issue,
    pub depth: u8,
    /// `None` for unscheduled rows
    pub bar: Option<Bar>,
    pub tooltip: Tooltip,
}

/// Time-axis marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub date: NaiveDate,
    pub label: String,
    pub offset_px: i64,
    pub offset_pct: f64,
}

/// Complete Gantt layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline<'a> {
    pub zoom: Zoom,
    pub px_per_day: i64,
    pub domain: DateDomain,
    pub chart_width_px: i64,
    /// Rows with both dates, sorted by start date
    pub scheduled: Vec<TimelineRow<'a>>,
    /// Rows missing either date, in hierarchy order
    pub unscheduled: Vec<TimelineRow<'a>>,
    pub ticks: Vec<Tick>,
}

/// Lay hierarchy rows out on a time axis.
pub fn scale_timeline<'a>(rows: &[HierarchyRow<'a>], options: &TimelineOptions) -> Timeline<'a> {
    let (mut scheduled, unscheduled): (Vec<HierarchyRow<'a>>, Vec<HierarchyRow<'a>>) =
        rows.iter().copied().partition(|row| row.issue.is_scheduled());
    scheduled.sort_by_key(|row| row.issue.start_date);

    let domain = DateDomain::from_scheduled(scheduled.iter().map(|row| row.issue), options.today);
    let px_per_day = options.zoom.px_per_day();

    let scheduled = scheduled
        .into_iter()
        .map(|row| {
            let bar = match (row.issue.start_date, row.issue.due_date) {
                (Some(start), Some(due)) => Some(Bar::new(start, due, &domain, px_per_day)),
                _ => None,
            };
            TimelineRow {
                issue: row.issue,
                depth: row.depth,
                bar,
                tooltip: Tooltip::for_issue(row.issue),
            }
        })
        .collect();

    let unscheduled = unscheduled
        .into_iter()
        .map(|row| TimelineRow {
            issue: row.issue,
            depth: row.depth,
            bar: None,
            tooltip: Tooltip::for_issue(row.issue),
        })
        .collect();

    Timeline {
        zoom: options.zoom,
        px_per_day,
        domain,
        chart_width_px: domain.total_days * px_per_day,
        scheduled,
        unscheduled,
        ticks: ticks(&domain, options.zoom, options.week_start),
    }
}

/// Axis ticks for the zoom level.
///
/// - day: every day in `[min, max)`
/// - week: the first `week_start` on or after `min`, then every 7 days up to `max`
/// - month: the 1st of each month strictly after `min`, up to `max`
pub fn ticks(domain: &DateDomain, zoom: Zoom, week_start: Weekday) -> Vec<Tick> {
    let px_per_day = zoom.px_per_day();
    let tick = |date: NaiveDate, label: String| {
        let offset = domain.offset_days(date);
        Tick {
            date,
            label,
            offset_px: offset * px_per_day,
            offset_pct: domain.pct(offset),
        }
    };

    let mut ticks = Vec::new();
    match zoom {
        Zoom::Day => {
            for day in 0..domain.total_days {
                let date = domain.min + Duration::days(day);
                ticks.push(tick(date, date.format("%b %-d").to_string()));
            }
        }
        Zoom::Week => {
            let lead = (7 + week_start.num_days_from_monday() as i64
                - domain.min.weekday().num_days_from_monday() as i64)
                % 7;
            let mut date = domain.min + Duration::days(lead);
            while date <= domain.max {
                ticks.push(tick(date, date.format("%b %-d").to_string()));
                date += Duration::days(7);
            }
        }
        Zoom::Month => {
            let mut cursor = first_of_next_month(domain.min);
            while let Some(date) = cursor.filter(|d| *d <= domain.max) {
                ticks.push(tick(date, date.format("%b %y").to_string()));
                cursor = first_of_next_month(date);
            }
        }
    }
    ticks
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?.checked_add_months(Months::new(1))
}
