//! Aggregations over issues and worklogs.
//!
//! - [`pivot`]: author × month time totals
//! - [`metrics`]: completion ratios and project totals
//!
//! Group totals live with the worklog table in [`crate::table`].

pub mod metrics;
pub mod pivot;

pub use metrics::{estimate_completion, logged_by_issue, status_completion, ProjectMetrics};
pub use pivot::{
    monthly_pivot, monthly_pivot_for, MonthWindow, MonthlyPivot, PivotRow, DEFAULT_PIVOT_MONTHS,
};
