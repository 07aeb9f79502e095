use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

const SAMPLE: &str = "\
Date,Category,Amount,Description
2024-01-01,Food,10.00,Lunch
2024-01-02,Food,20.00,Dinner
2024-02-01,Rent,500.00,February rent
";

fn write_csv(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("expenses.csv");
    std::fs::write(&path, content).unwrap();
    path
}

fn tally(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tally").unwrap();
    cmd.env("HOME", home).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn summary_prints_kpis() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), SAMPLE);
    tally(dir.path())
        .arg("summary")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded 3 transactions"))
        .stdout(predicate::str::contains("$530.00"))
        .stdout(predicate::str::contains("Cumulative Spending Over Time"));
}

#[test]
fn summary_json_is_machine_readable() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), SAMPLE);
    let output = tally(dir.path())
        .args(["--json", "summary"])
        .arg(&csv)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["kpis"]["count"], 3);
    assert_eq!(json["charts"][1]["kind"], "line");
    assert_eq!(json["charts"][1]["points"][2]["value"].as_f64(), Some(530.0));
}

#[test]
fn malformed_amount_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "Date,Category,Amount\n2024-01-01,Food,abc\n");
    tally(dir.path())
        .arg("summary")
        .arg(&csv)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Malformed amount on row 1"));
}

#[test]
fn oversized_amount_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(
        dir.path(),
        "Date,Category,Amount\n\
         2024-01-01,Food,50000000000000000000000000000\n\
         2024-01-02,Food,50000000000000000000000000000\n",
    );
    tally(dir.path())
        .arg("summary")
        .arg(&csv)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Malformed amount on row 1"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn malformed_date_fails() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "Date,Category,Amount\nsoon,Food,1\n");
    tally(dir.path())
        .arg("history")
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed date"));
}

#[test]
fn empty_file_reports_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "Date,Category,Amount\n");
    tally(dir.path())
        .arg("summary")
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No transactions"));
}

#[test]
fn monthly_rejects_unknown_month() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), SAMPLE);
    tally(dir.path())
        .arg("monthly")
        .arg(&csv)
        .args(["--month", "2023-07"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown month: \"2023-07\""));
}

#[test]
fn monthly_shows_extreme_months() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), SAMPLE);
    tally(dir.path())
        .arg("monthly")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Most Expense Month"))
        .stdout(predicate::str::contains("2024-02"))
        .stdout(predicate::str::contains("Data Visualization for Month: 2024-01"));
}

#[test]
fn category_rejects_unknown_chart() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), SAMPLE);
    tally(dir.path())
        .arg("category")
        .arg(&csv)
        .args(["--chart", "radar"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown chart type"));
}

#[test]
fn history_largest_respects_count() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), SAMPLE);
    let output = tally(dir.path())
        .args(["--json", "history"])
        .arg(&csv)
        .args(["--mode", "largest", "-n", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["category"], "Rent");
    assert_eq!(rows[1]["description"], "Dinner");
}

#[test]
fn history_category_without_selection_prints_hint() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), SAMPLE);
    tally(dir.path())
        .arg("history")
        .arg(&csv)
        .args(["--mode", "category"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Please select at least one category"));
}

#[test]
fn history_warns_when_category_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), SAMPLE);
    tally(dir.path())
        .arg("history")
        .arg(&csv)
        .args(["--mode", "largest", "--category", "Food"])
        .assert()
        .success()
        .stdout(predicate::str::contains("February rent"))
        .stderr(predicate::str::contains("--category is only used in category mode"));
}

#[test]
fn history_category_lists_matches() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), SAMPLE);
    tally(dir.path())
        .arg("history")
        .arg(&csv)
        .args(["--mode", "category", "--category", "Food"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transactions in: Food"))
        .stdout(predicate::str::contains("Lunch"))
        .stdout(predicate::str::contains("February rent").not());
}

#[test]
fn config_set_persists_top_n() {
    let dir = tempfile::tempdir().unwrap();
    tally(dir.path())
        .args(["config", "set", "top_n", "1"])
        .assert()
        .success();
    assert!(dir.path().join(".config/tally/settings.json").exists());

    let csv = write_csv(dir.path(), SAMPLE);
    let output = tally(dir.path())
        .args(["--json", "history"])
        .arg(&csv)
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[test]
fn config_set_rejects_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    tally(dir.path())
        .args(["config", "set", "theme", "dark"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown setting"));
}
