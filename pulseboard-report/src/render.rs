//! Terminal and JSON rendering for the report commands.

use anyhow::Result;
use pulseboard_core::analytics::{MonthlyPivot, ProjectMetrics};
use pulseboard_core::format::{format_cell, format_date, format_hours_rounded, format_hours_split, truncate};
use pulseboard_core::table::{Page, WorklogGroup};
use pulseboard_core::timeline::{Timeline, TimelineRow};
use pulseboard_core::{Config, Worklog};

use crate::sources::{CheckReport, ServiceCheck};
use pulseboard_core::config::ProjectConfig;

/// Character columns used for Gantt bars.
const BAR_COLUMNS: usize = 48;
const RULE_WIDTH: usize = 78;

pub fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn header(title: &str) {
    println!();
    println!("╭{}╮", "─".repeat(RULE_WIDTH - 2));
    println!("│{:^width$}│", title, width = RULE_WIDTH - 2);
    println!("╰{}╯", "─".repeat(RULE_WIDTH - 2));
    println!();
}

// ============================================
// Projects
// ============================================

pub fn projects_json(config: &Config) -> serde_json::Value {
    serde_json::Value::Array(
        config
            .projects
            .iter()
            .map(|p| {
                serde_json::json!({
                    "name": p.name,
                    "jira_project_key": p.jira_project_key,
                    "description": p.description,
                    "jira_linked": p.jira.is_some(),
                    "tempo_linked": p.tempo.is_some(),
                })
            })
            .collect(),
    )
}

pub fn print_projects(config: &Config) {
    if config.projects.is_empty() {
        println!("No projects configured. Add [[projects]] to {}", Config::config_path().display());
        return;
    }

    println!("{:<24} {:<10} {:<6} {:<6} DESCRIPTION", "NAME", "KEY", "JIRA", "TEMPO");
    for project in &config.projects {
        println!(
            "{:<24} {:<10} {:<6} {:<6} {}",
            truncate(&project.name, 24),
            project.jira_project_key,
            linked(project.jira.is_some()),
            linked(project.tempo.is_some()),
            project.description.as_deref().unwrap_or("")
        );
    }
}

fn linked(yes: bool) -> &'static str {
    if yes {
        "yes"
    } else {
        "-"
    }
}

// ============================================
// Check
// ============================================

pub fn print_check(project: &ProjectConfig, report: &CheckReport) {
    println!("Checking connections for {} ({})", project.name, project.jira_project_key);
    print_service("Jira", &report.jira);
    print_service("Tempo", &report.tempo);
}

fn print_service(name: &str, check: &ServiceCheck) {
    match check {
        ServiceCheck::NotConfigured => println!("  {:<6} not configured", name),
        ServiceCheck::Ok { detail } => println!("  {:<6} ok ({})", name, detail),
        ServiceCheck::Failed { error } => println!("  {:<6} FAILED: {}", name, error),
    }
}

// ============================================
// Gantt
// ============================================

pub fn print_gantt(project_key: &str, timeline: &Timeline<'_>) {
    header(&format!("{} SCHEDULE", project_key));

    println!(
        "   {} to {} ({} days, {} zoom)",
        format_date(timeline.domain.min),
        format_date(timeline.domain.max),
        timeline.domain.total_days,
        timeline.zoom
    );
    println!("   {:<44} {}", "", axis(timeline));
    println!();

    if timeline.scheduled.is_empty() {
        println!("   No scheduled issues.");
    }
    for row in &timeline.scheduled {
        println!("   {:<44} {}", row_label(row), bar(row));
    }

    if !timeline.unscheduled.is_empty() {
        println!();
        println!("UNSCHEDULED");
        for row in &timeline.unscheduled {
            let missing = match (row.tooltip.start.as_deref(), row.tooltip.due.as_deref()) {
                (None, None) => "no dates".to_string(),
                (Some(start), None) => format!("starts {}", start),
                (None, Some(due)) => format!("due {}", due),
                (Some(_), Some(_)) => String::new(),
            };
            println!("   {:<44} {}", row_label(row), missing);
        }
    }
    println!();
}

fn row_label(row: &TimelineRow<'_>) -> String {
    let indent = "  ".repeat(row.depth as usize);
    let text = format!("{}{} {}", indent, row.issue.key, row.issue.summary);
    truncate(&text, 44)
}

fn column(pct: f64) -> usize {
    ((pct / 100.0) * BAR_COLUMNS as f64).round().max(0.0) as usize
}

fn bar(row: &TimelineRow<'_>) -> String {
    let Some(bar) = row.bar else {
        return String::new();
    };
    let left = column(bar.left_pct).min(BAR_COLUMNS - 1);
    let width = column(bar.width_pct).max(1).min(BAR_COLUMNS - left);
    format!(
        "{}{}{} {}",
        " ".repeat(left),
        "█".repeat(width),
        " ".repeat(BAR_COLUMNS - left - width),
        row.tooltip.status
    )
}

/// Tick labels placed along the bar columns, skipping any that would overlap.
fn axis(timeline: &Timeline<'_>) -> String {
    let mut line = String::new();
    let mut used = 0usize;
    for tick in &timeline.ticks {
        let at = column(tick.offset_pct);
        if at < used || at + tick.label.chars().count() > BAR_COLUMNS {
            continue;
        }
        line.push_str(&" ".repeat(at - used));
        line.push_str(&tick.label);
        used = at + tick.label.chars().count() + 1;
        line.push(' ');
    }
    line
}

// ============================================
// Worklogs
// ============================================

fn print_worklog(worklog: &Worklog) {
    println!(
        "   {:<10} {:<10} {:<20} {:>8}  {}",
        worklog.start_date,
        worklog.issue_key,
        truncate(worklog.resolved_author().unwrap_or("-"), 20),
        format_hours_split(worklog.time_spent_seconds),
        truncate(&worklog.issue_summary, 30)
    );
}

pub fn print_page(project_key: &str, page: &Page<'_>) {
    header(&format!("{} WORKLOGS", project_key));
    if page.rows.is_empty() {
        println!("   No worklogs found.");
        println!();
        return;
    }
    for worklog in &page.rows {
        print_worklog(worklog);
    }
    println!();
    println!(
        "   Page {}/{} ({} worklogs){}{}",
        page.index + 1,
        page.total_pages,
        page.total_rows,
        if page.has_prev { "  [prev]" } else { "" },
        if page.has_next { "  [next]" } else { "" }
    );
    println!();
}

pub fn print_groups(project_key: &str, groups: &[WorklogGroup<'_>]) {
    header(&format!("{} WORKLOGS", project_key));
    if groups.is_empty() {
        println!("   No worklogs found.");
        println!();
        return;
    }
    for group in groups {
        println!(
            "{} ({}, {} entries)",
            group.name,
            format_hours_split(group.total_seconds),
            group.rows.len()
        );
        for worklog in &group.rows {
            print_worklog(worklog);
        }
        println!();
    }
}

// ============================================
// Monthly pivot
// ============================================

pub fn pivot_json(pivot: &MonthlyPivot) -> serde_json::Value {
    serde_json::json!({
        "months": pivot.labels(),
        "rows": pivot.rows.iter().map(|row| serde_json::json!({
            "author": row.author,
            "cells": row.cells,
            "total_seconds": row.total_seconds,
        })).collect::<Vec<_>>(),
        "column_totals": pivot.column_totals,
        "grand_total": pivot.grand_total,
    })
}

pub fn print_pivot(project_key: &str, pivot: &MonthlyPivot) {
    header(&format!("{} MONTHLY HOURS", project_key));

    let labels = pivot.labels();
    print!("   {:<24}", "AUTHOR");
    for label in &labels {
        print!(" {:>9}", label);
    }
    println!(" {:>9}", "TOTAL");

    if pivot.is_empty() {
        println!("   No time logged in this period.");
        println!();
        return;
    }

    for row in &pivot.rows {
        print!("   {:<24}", truncate(&row.author, 24));
        for cell in row.display_cells() {
            print!(" {:>9}", cell);
        }
        println!(" {:>9}", format_cell(Some(row.total_seconds)));
    }

    print!("   {:<24}", "TOTAL");
    for total in &pivot.column_totals {
        print!(" {:>9}", format_cell(Some(*total)));
    }
    println!(" {:>9}", format_cell(Some(pivot.grand_total)));
    println!();
}

// ============================================
// Metrics
// ============================================

pub fn print_metrics(project_key: &str, metrics: &ProjectMetrics) {
    header(&format!("{} METRICS", project_key));
    println!(
        "   Estimate completion: {:>3}%   ({} logged of {} estimated)",
        metrics.estimate_completion_pct,
        metrics.total_hours_display(),
        format_hours_rounded(metrics.estimated_seconds)
    );
    println!(
        "   Status completion:   {:>3}%   ({} of {} issues done)",
        metrics.status_completion_pct, metrics.done_count, metrics.issue_count
    );
    println!(
        "   Time logged:         {}   ({} worklogs)",
        metrics.total_hours_display(),
        metrics.worklog_count
    );
    if !metrics.logged_by_issue.is_empty() {
        println!();
        println!("   Logged by issue:");
        for (key, seconds) in &metrics.logged_by_issue {
            println!("     {:<12} {:>9}", key, format_hours_split(*seconds));
        }
    }
    println!();
}
