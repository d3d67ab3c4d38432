//! End-to-end tests for the aqs-eval binary
//!
//! Each test writes result documents into a temporary directory and runs
//! the compiled binary against it.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn aqs_eval(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_aqs-eval"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("Failed to run aqs-eval")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// A clean run on a mid-sized project; scores 97 when `health` is 90
fn result_json(combo: &str, mode: &str, task: &str, health: u32, dead: u32) -> String {
    format!(
        r#"{{
  "agent": "{combo}",
  "mode": "{mode}",
  "task": "{task}",
  "scores": {{
    "health": {health}, "dead_symbols": {dead}, "avg_complexity": 5, "p90_complexity": 10,
    "high_complexity_count": 0, "tangle_ratio": 0.0, "critical_issues": 0, "antipattern_total": 0
  }},
  "file_stats": {{"total_files": 12}},
  "structure": {{"readme": true, "tests": {{"tests_found": true, "test_file_count": 4}}, "build": {{"has_build_config": true}}}},
  "roam": {{"init": {{"success": true}}}},
  "signature": {{"cli_version": "1.2.3", "model": "test-model"}}
}}"#
    )
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).expect("Failed to write result file");
}

#[test]
fn test_missing_directory_fails() {
    let tmp = TempDir::new().unwrap();
    let output = aqs_eval(&["compare", "does-not-exist"], tmp.path());
    assert!(!output.status.success());
}

#[test]
fn test_empty_directory_fails_without_report() {
    let tmp = TempDir::new().unwrap();
    let results = tmp.path().join("results");
    fs::create_dir_all(&results).unwrap();
    write(&results, "broken.json", "{ nope");

    let output = aqs_eval(
        &["compare", "results", "--report", "out/report.html"],
        tmp.path(),
    );
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No result files found"));
    assert!(!tmp.path().join("out/report.html").exists());
}

#[test]
fn test_compare_skips_bad_files_and_writes_reports() {
    let tmp = TempDir::new().unwrap();
    let results = tmp.path().join("results");
    fs::create_dir_all(&results).unwrap();
    write(&results, "codex_todo_vanilla.json", &result_json("codex", "vanilla", "todo", 90, 0));
    write(&results, "codex_todo_roam-cli.json", &result_json("codex", "roam-cli", "todo", 96, 0));
    write(&results, "zz_broken.json", "not json at all");

    let output = aqs_eval(
        &[
            "compare",
            "results",
            "--report",
            "out/report.html",
            "--json",
            "out/report.json",
        ],
        tmp.path(),
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("Loaded 2 evaluations (1 file(s) skipped)."));
    assert!(text.contains("TASK: todo"));
    assert!(text.contains("97 (A)"));
    assert!(text.contains("+6"));
    assert!(stderr(&output).contains("zz_broken.json"));

    let html = fs::read_to_string(tmp.path().join("out/report.html")).unwrap();
    assert!(html.contains("grade-a"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("out/report.json")).unwrap())
            .unwrap();
    assert_eq!(json["evaluations"], 2);
    assert_eq!(json["rankings"][0]["combo"], "codex");
}

#[test]
fn test_later_file_wins_for_same_key() {
    let tmp = TempDir::new().unwrap();
    let results = tmp.path().join("results");
    fs::create_dir_all(&results).unwrap();
    write(&results, "a.json", &result_json("codex", "vanilla", "todo", 10, 0));
    write(&results, "b.json", &result_json("codex", "vanilla", "todo", 90, 0));

    let output = aqs_eval(&["compare", "results", "--json", "report.json"], tmp.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(json["evaluations"], 1);
    assert_eq!(json["overview"][0]["cells"][0]["total"], 97);
}

#[test]
fn test_emit_site_uses_configured_path() {
    let tmp = TempDir::new().unwrap();
    let results = tmp.path().join("results");
    fs::create_dir_all(&results).unwrap();
    write(&results, "r.json", &result_json("codex", "vanilla", "todo", 90, 0));
    write(tmp.path(), "config.yaml", "site_path: site/index.html\ntitle: Nightly\n");

    let output = aqs_eval(
        &["compare", "results", "--emit-site", "--config", "config.yaml"],
        tmp.path(),
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let html = fs::read_to_string(tmp.path().join("site/index.html")).unwrap();
    assert!(html.contains("<h1>Nightly</h1>"));
}

#[test]
fn test_group_filter_can_empty_the_run() {
    let tmp = TempDir::new().unwrap();
    let results = tmp.path().join("results");
    fs::create_dir_all(&results).unwrap();
    write(&results, "r.json", &result_json("codex", "vanilla", "todo", 90, 0));

    let output = aqs_eval(&["compare", "results", "--group", "algorithm"], tmp.path());
    assert!(!output.status.success());
}

#[test]
fn test_score_single_file() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "r.json", &result_json("codex", "vanilla", "todo", 90, 10));

    let output = aqs_eval(&["score", "r.json"], tmp.path());
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("Agent Quality Score: 89/100  (Grade: B)"));
    assert!(text.contains("12/20"));

    let output = aqs_eval(&["score", "r.json", "--json"], tmp.path());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["aqs"], 89);
    assert_eq!(json["grade"], "B");
    assert_eq!(json["max_points"]["health"], 35);
}

#[test]
fn test_init_writes_sample_config() {
    let tmp = TempDir::new().unwrap();
    let output = aqs_eval(&["init", "--output", "cfg.yaml"], tmp.path());
    assert!(output.status.success());

    let content = fs::read_to_string(tmp.path().join("cfg.yaml")).unwrap();
    assert!(content.contains("baseline_mode: vanilla"));
}
