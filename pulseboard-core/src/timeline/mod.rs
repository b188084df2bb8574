//! Gantt construction
//!
//! Issues flow through three pure stages, each recomputed whenever the
//! input snapshot changes:
//!
//! ```text
//! Vec<Issue> ──► IssueFilter ──► build_hierarchy ──► scale_timeline ──► Timeline
//!                (optional)      (Epic/Story/task)   (dates → geometry)
//! ```

pub mod filter;
pub mod hierarchy;
pub mod scale;

pub use filter::IssueFilter;
pub use hierarchy::{build_hierarchy, HierarchyRow};
pub use scale::{
    scale_timeline, Bar, DateDomain, Tick, Timeline, TimelineOptions, TimelineRow, Tooltip, Zoom,
};
