use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
        }
    }

    fn write_config(&self, content: &str) {
        let path = self.xdg_config.join("pulseboard/config.toml");
        fs::create_dir_all(path.parent().expect("missing config parent"))
            .expect("failed to create config directory");
        fs::write(path, content).expect("failed to write config");
    }
}

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../pulseboard-core/tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn run(env: &CliTestEnv, args: &[&str]) -> Output {
    let mut command = Command::new(PathBuf::from(assert_cmd::cargo::cargo_bin!("pulseboard")));

    command
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute pulseboard: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "pulseboard {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn run_ok(env: &CliTestEnv, args: &[&str]) -> String {
    let output = run(env, args);
    assert_success(args, &output);
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn run_json(env: &CliTestEnv, args: &[&str]) -> serde_json::Value {
    let stdout = run_ok(env, args);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("expected JSON output, got error {e}:\n{stdout}"))
}

const CONFIG: &str = r#"
[timeline]
zoom = "day"

[[projects]]
name = "Acme Portal"
jira_project_key = "ACME"
description = "Client portal rebuild"

[[projects]]
name = "Website"
jira_project_key = "WEB"
"#;

#[test]
fn gantt_json_lays_out_snapshot_issues() {
    let env = CliTestEnv::new();
    let issues = fixture("jira-search.json");
    let args = [
        "gantt", "--issues", &issues, "--today", "2024-03-20", "--format", "json",
    ];
    let json = run_json(&env, &args);

    let scheduled: Vec<&str> = json["scheduled"]
        .as_array()
        .expect("scheduled array")
        .iter()
        .map(|row| row["issue"]["key"].as_str().unwrap())
        .collect();
    assert_eq!(scheduled, vec!["ACME-1", "ACME-2", "ACME-3", "ACME-6"]);
    assert_eq!(json["unscheduled"].as_array().unwrap().len(), 2);
    assert_eq!(json["zoom"], "week");
    assert_eq!(json["domain"]["total_days"], 66);
}

#[test]
fn gantt_text_uses_configured_zoom_and_filters() {
    let env = CliTestEnv::new();
    env.write_config(CONFIG);
    let issues = fixture("jira-search.json");
    let args = [
        "gantt", "--project", "acme", "--issues", &issues, "--status", "done",
    ];
    let stdout = run_ok(&env, &args);

    assert!(stdout.contains("ACME SCHEDULE"), "got:\n{stdout}");
    assert!(stdout.contains("day zoom"), "got:\n{stdout}");
    assert!(stdout.contains("ACME-2 Login page"));
    assert!(stdout.contains("UNSCHEDULED"));
    assert!(!stdout.contains("ACME-1 "), "filtered epic should be hidden:\n{stdout}");
}

#[test]
fn worklogs_csv_to_stdout() {
    let env = CliTestEnv::new();
    let worklogs = fixture("tempo-worklogs.json");
    let args = [
        "worklogs", "--worklogs", &worklogs, "--sort", "time_spent_seconds", "--desc", "--csv", "-",
    ];
    let stdout = run_ok(&env, &args);
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines[0], "Issue Key,Issue Summary,Author,Hours,Date,Description");
    assert!(lines[1].starts_with("ACME-2,\"Login page\",Ada Lovelace,2.00,2024-03-04"));
    assert_eq!(lines.len(), 6);
}

#[test]
fn worklogs_csv_to_file() {
    let env = CliTestEnv::new();
    let worklogs = fixture("tempo-worklogs.json");
    let target = env.home.join("export.csv");
    let target_arg = target.to_string_lossy().into_owned();
    let args = [
        "worklogs", "--worklogs", &worklogs, "--from", "2024-03-01", "--csv", &target_arg,
    ];
    run_ok(&env, &args);

    let csv = fs::read_to_string(&target).expect("csv file should be written");
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("\"Pair, review \"\"reset\"\" mail\""));
}

#[test]
fn worklogs_grouped_by_assignee() {
    let env = CliTestEnv::new();
    let worklogs = fixture("tempo-worklogs.json");
    let args = ["worklogs", "--worklogs", &worklogs, "--group-by", "assignee"];
    let stdout = run_ok(&env, &args);

    let ada = stdout.find("Ada Lovelace (3h, 2 entries)").expect("Ada group");
    let grace = stdout.find("Grace Hopper (1h 30m, 2 entries)").expect("Grace group");
    let unknown = stdout.find("Unknown (1h 30m, 1 entries)").expect("Unknown group");
    assert!(ada < grace && grace < unknown);
}

#[test]
fn worklogs_page_json_clamps() {
    let env = CliTestEnv::new();
    let worklogs = fixture("proxy-worklogs.json");
    let args = [
        "worklogs", "--worklogs", &worklogs, "--page", "9", "--format", "json",
    ];
    let json = run_json(&env, &args);

    assert_eq!(json["index"], 0);
    assert_eq!(json["total_pages"], 1);
    assert_eq!(json["has_next"], false);
    assert_eq!(json["rows"].as_array().unwrap().len(), 4);
}

#[test]
fn monthly_pivot_json() {
    let env = CliTestEnv::new();
    let worklogs = fixture("tempo-worklogs.json");
    let args = [
        "monthly", "--worklogs", &worklogs, "--today", "2024-03-20", "--format", "json",
    ];
    let json = run_json(&env, &args);

    assert_eq!(
        json["months"],
        serde_json::json!(["Dec 2023", "Jan 2024", "Feb 2024", "Mar 2024"])
    );
    assert_eq!(json["rows"][0]["author"], "Ada Lovelace");
    assert_eq!(json["grand_total"], 16200);
}

#[test]
fn monthly_pivot_text_marks_empty_cells() {
    let env = CliTestEnv::new();
    let worklogs = fixture("tempo-worklogs.json");
    let args = [
        "monthly", "--worklogs", &worklogs, "--today", "2024-03-20", "--months", "2",
    ];
    let stdout = run_ok(&env, &args);

    assert!(stdout.contains("Feb 2024"));
    assert!(!stdout.contains("Jan 2024"));
    let grace = stdout
        .lines()
        .find(|line| line.contains("Grace Hopper"))
        .expect("Grace row");
    assert!(grace.contains("—"), "expected no-data marker in: {grace}");
}

#[test]
fn monthly_pivot_zero_totals_use_marker() {
    let env = CliTestEnv::new();
    let worklogs = fixture("tempo-worklogs.json");
    let args = [
        "monthly", "--worklogs", &worklogs, "--today", "2023-10-15", "--months", "1",
    ];
    let stdout = run_ok(&env, &args);

    let grace = stdout
        .lines()
        .find(|line| line.contains("Grace Hopper"))
        .expect("Grace row");
    assert_eq!(grace.matches('—').count(), 2, "cell and total should be marked: {grace}");
    assert!(!stdout.contains("0h"), "zero hours leaked into: {stdout}");
}

#[test]
fn metrics_json_from_snapshots() {
    let env = CliTestEnv::new();
    let issues = fixture("jira-search.json");
    let worklogs = fixture("tempo-worklogs.json");
    let args = [
        "metrics", "--issues", &issues, "--worklogs", &worklogs, "--format", "json",
    ];
    let json = run_json(&env, &args);

    assert_eq!(json["status_completion_pct"], 50);
    assert_eq!(json["estimate_completion_pct"], 50);
    assert_eq!(json["worklog_count"], 5);
    assert_eq!(json["logged_by_issue"]["ACME-2"], 12600);
    assert_eq!(json["logged_by_issue"]["ACME-1"], 0);
}

#[test]
fn projects_lists_configured_projects() {
    let env = CliTestEnv::new();
    env.write_config(CONFIG);

    let stdout = run_ok(&env, &["projects"]);
    assert!(stdout.contains("Acme Portal"));
    assert!(stdout.contains("WEB"));

    let json = run_json(&env, &["projects", "--format", "json"]);
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["jira_linked"], false);
}

#[test]
fn check_reports_unlinked_credentials() {
    let env = CliTestEnv::new();
    env.write_config(CONFIG);

    let stdout = run_ok(&env, &["check", "--project", "WEB"]);
    assert!(stdout.contains("Jira   not configured"), "got:\n{stdout}");
    assert!(stdout.contains("Tempo  not configured"));
}

#[test]
fn missing_project_is_an_error() {
    let env = CliTestEnv::new();
    env.write_config(CONFIG);

    let output = run(&env, &["gantt"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no project selected"), "got:\n{stderr}");

    let output = run(&env, &["metrics", "--project", "nope"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("project not found: nope"), "got:\n{stderr}");
}

#[test]
fn invalid_config_is_rejected() {
    let env = CliTestEnv::new();
    env.write_config("[fetch]\njira_page_size = 500\n");

    let output = run(&env, &["projects"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("jira_page_size"), "got:\n{stderr}");
}

#[test]
fn verbose_logs_to_stderr_only() {
    let env = CliTestEnv::new();
    let issues = fixture("jira-search.json");
    let args = ["metrics", "--issues", &issues, "--verbose", "--format", "json"];
    let output = run(&env, &args);
    assert_success(&args, &output);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Loaded project snapshot"), "got:\n{stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str::<serde_json::Value>(&stdout).expect("stdout stays pure JSON");
}
