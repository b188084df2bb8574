//! # pulseboard-core
//!
//! Core library for pulseboard - client-facing project progress reports
//! built from Jira issues and Tempo worklogs.
//!
//! This library provides:
//! - Domain types for issues and worklogs
//! - Normalizers for Jira/Tempo REST payloads and flattened proxy payloads
//! - Gantt hierarchy and timeline geometry
//! - Worklog filtering, grouping, pagination and CSV export
//! - Monthly pivots and completion metrics
//! - Async Jira/Tempo clients and a JSON snapshot source
//! - Configuration management and logging
//!
//! ## Pipeline
//!
//! Raw payloads go through [`ingest`] into [`Issue`] and [`Worklog`] values.
//! Issues feed [`timeline::build_hierarchy`] and [`timeline::scale_timeline`];
//! worklogs feed [`table::WorklogQuery`] and [`analytics`]. Everything after
//! ingestion is a pure function of borrowed data and an injected `today`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use pulseboard_core::source::{Dashboard, SnapshotSource};
//! use pulseboard_core::timeline::{build_hierarchy, scale_timeline, TimelineOptions, Zoom};
//! use pulseboard_core::DateRange;
//!
//! # async fn run() -> pulseboard_core::Result<()> {
//! let source = SnapshotSource::new(Some("issues.json".into()), Some("worklogs.json".into()));
//! let dashboard = Dashboard::new(source.clone(), source);
//! let snapshot = dashboard.load("ACME", DateRange::default()).await?;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
//! let rows = build_hierarchy(&snapshot.issues);
//! let timeline = scale_timeline(&rows, &TimelineOptions::new(Zoom::Week, today));
//! println!("{} scheduled rows", timeline.scheduled.len());
//! # Ok(())
//! # }
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use source::{Dashboard, ProjectSnapshot};
pub use types::*;

// Public modules
pub mod analytics;
pub mod config;
pub mod error;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod source;
pub mod table;
pub mod timeline;
pub mod types;
