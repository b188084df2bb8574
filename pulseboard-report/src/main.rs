//! pulseboard - client project reports from Jira and Tempo
//!
//! Renders the Gantt schedule, worklog table, monthly time pivot and
//! completion metrics for a configured project, either live from the Jira
//! and Tempo APIs or from saved JSON snapshots.

mod render;
mod sources;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pulseboard_core::analytics::{monthly_pivot_for, MonthWindow, ProjectMetrics, DEFAULT_PIVOT_MONTHS};
use pulseboard_core::source::{Dashboard, IssueSource, WorklogSource};
use pulseboard_core::table::{write_csv, GroupBy, SortDir, SortField, WorklogQuery};
use pulseboard_core::timeline::{build_hierarchy, scale_timeline, IssueFilter, TimelineOptions, Zoom};
use pulseboard_core::{Config, DateRange, StatusCategory};

use sources::Sources;

#[derive(Parser, Debug)]
#[command(name = "pulseboard")]
#[command(about = "Client project reports from Jira and Tempo")]
#[command(version)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/pulseboard/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Project name or Jira key
    #[arg(short, long, global = true)]
    project: Option<String>,

    /// Read issues from a saved JSON file instead of Jira
    #[arg(long, global = true)]
    issues: Option<PathBuf>,

    /// Read worklogs from a saved JSON file instead of Tempo
    #[arg(long, global = true)]
    worklogs: Option<PathBuf>,

    /// Reference date for month windows and empty timelines (YYYY-MM-DD)
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also log to stderr at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured projects
    Projects,
    /// Test the selected project's Jira and Tempo credentials
    Check,
    /// Gantt schedule of epics, stories and tasks
    Gantt(GanttArgs),
    /// Worklog table, grouped or paginated, or CSV export
    Worklogs(WorklogArgs),
    /// Hours per author per month
    Monthly {
        /// Number of months ending with the current one
        #[arg(long, default_value_t = DEFAULT_PIVOT_MONTHS)]
        months: u32,
    },
    /// Completion and time totals
    Metrics,
}

#[derive(Args, Debug)]
struct GanttArgs {
    /// Zoom level: day, week or month (default from config)
    #[arg(long)]
    zoom: Option<Zoom>,

    /// Only these issue types (repeatable)
    #[arg(long = "type")]
    issue_types: Vec<String>,

    /// Only these status categories: todo, in_progress, done (repeatable)
    #[arg(long)]
    status: Vec<StatusCategory>,

    /// Only issues assigned to this person ("Unassigned" for none)
    #[arg(long)]
    assignee: Option<String>,

    /// Text to match in key or summary
    #[arg(long)]
    search: Option<String>,

    /// Keep issues overlapping a range starting at this date
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Keep issues overlapping a range ending at this date
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct WorklogArgs {
    /// Text to match in issue key, summary or author
    #[arg(long)]
    search: Option<String>,

    /// First day to include
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day to include
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Sort field: issue_key, author, time_spent_seconds, start_date
    #[arg(long)]
    sort: Option<SortField>,

    /// Sort descending
    #[arg(long)]
    desc: bool,

    /// Grouping: none, epic, assignee
    #[arg(long, default_value = "none")]
    group_by: GroupBy,

    /// Page number, starting at 1 (ungrouped only)
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Write CSV to this file ("-" for stdout) instead of the table
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
        config.logging.stderr = true;
    }
    let _log_guard = pulseboard_core::logging::init(&config.logging).ok();

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let json = cli.format == OutputFormat::Json;

    match &cli.command {
        Command::Projects => {
            if json {
                render::print_json(&render::projects_json(&config))?;
            } else {
                render::print_projects(&config);
            }
        }
        Command::Check => run_check(&cli, &config, json).await?,
        Command::Gantt(args) => run_gantt(&cli, &config, args, today, json).await?,
        Command::Worklogs(args) => run_worklogs(&cli, &config, args, json).await?,
        Command::Monthly { months } => {
            let sources = Sources::resolve(&cli, &config)?;
            let window = MonthWindow::trailing(today, (*months).max(1));
            let range = DateRange::new(
                window.first().and_then(MonthWindow::start),
                window.last().and_then(MonthWindow::end),
            );
            let worklogs = sources
                .worklogs
                .worklogs(&sources.project_key, range)
                .await
                .context("failed to load worklogs")?;
            let pivot = monthly_pivot_for(&worklogs, today, (*months).max(1));
            if json {
                render::print_json(&render::pivot_json(&pivot))?;
            } else {
                render::print_pivot(&sources.project_key, &pivot);
            }
        }
        Command::Metrics => {
            let sources = Sources::resolve(&cli, &config)?;
            let project_key = sources.project_key.clone();
            let dashboard = Dashboard::new(sources.issues, sources.worklogs);
            let snapshot = dashboard
                .load(&project_key, DateRange::default())
                .await
                .context("failed to load project data")?;
            let metrics = ProjectMetrics::compute(&snapshot.issues, &snapshot.worklogs);
            if json {
                render::print_json(&serde_json::to_value(&metrics)?)?;
            } else {
                render::print_metrics(&project_key, &metrics);
            }
        }
    }

    Ok(())
}

async fn run_check(cli: &Cli, config: &Config, json: bool) -> Result<()> {
    let project = sources::select_project(cli, config)?
        .context("no project selected; pass --project")?;
    let report = sources::check_connections(project, &config.fetch).await;

    if json {
        render::print_json(&serde_json::to_value(&report)?)?;
    } else {
        render::print_check(project, &report);
    }

    if report.failed() {
        anyhow::bail!("connection check failed for {}", project.name);
    }
    Ok(())
}

async fn run_gantt(
    cli: &Cli,
    config: &Config,
    args: &GanttArgs,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let sources = Sources::resolve(cli, config)?;
    let issues = sources
        .issues
        .issues(&sources.project_key)
        .await
        .context("failed to load issues")?;

    let filter = IssueFilter {
        issue_types: args.issue_types.clone(),
        statuses: args.status.clone(),
        assignee: args.assignee.clone(),
        range: DateRange::new(args.from, args.to),
        search: args.search.clone(),
    };
    let issues = if filter.is_empty() {
        issues
    } else {
        tracing::debug!(?filter, "filtering issues");
        filter.apply(&issues)
    };
    let rows = build_hierarchy(&issues);

    let options = TimelineOptions {
        zoom: args.zoom.unwrap_or(config.timeline.zoom),
        week_start: config.timeline.week_start()?,
        today,
    };
    let timeline = scale_timeline(&rows, &options);

    if json {
        render::print_json(&serde_json::to_value(&timeline)?)?;
    } else {
        render::print_gantt(&sources.project_key, &timeline);
    }
    Ok(())
}

async fn run_worklogs(cli: &Cli, config: &Config, args: &WorklogArgs, json: bool) -> Result<()> {
    let sources = Sources::resolve(cli, config)?;
    let range = DateRange::new(args.from, args.to);
    let worklogs = sources
        .worklogs
        .worklogs(&sources.project_key, range)
        .await
        .context("failed to load worklogs")?;

    let query = WorklogQuery {
        search: args.search.clone(),
        range,
        sort: args
            .sort
            .map(|field| (field, if args.desc { SortDir::Desc } else { SortDir::Asc })),
        group_by: args.group_by,
    };

    if let Some(path) = &args.csv {
        let rows = query.filter_sort(&worklogs);
        let count = rows.len();
        if path.as_os_str() == "-" {
            let stdout = std::io::stdout();
            write_csv(&mut stdout.lock(), rows)?;
        } else {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_csv(&mut file, rows)?;
            eprintln!("Wrote {} worklogs to {}", count, path.display());
        }
        return Ok(());
    }

    if query.group_by == GroupBy::None {
        let page = query.page(&worklogs, args.page.saturating_sub(1));
        if json {
            render::print_json(&serde_json::to_value(&page)?)?;
        } else {
            render::print_page(&sources.project_key, &page);
        }
    } else {
        let groups = query.groups(&worklogs);
        if json {
            render::print_json(&serde_json::to_value(&groups)?)?;
        } else {
            render::print_groups(&sources.project_key, &groups);
        }
    }
    Ok(())
}
