use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"{
  "householdId": 1,
  "members": [
    {"id": 1, "name": "たろう"},
    {"id": 2, "name": "はなこ"}
  ],
  "categories": [
    {"id": 1, "majorName": "食費", "minorName": "食料品", "costType": "variable"},
    {"id": 2, "majorName": "住宅", "minorName": "家賃", "costType": "fixed"},
    {"id": 3, "majorName": "立替", "minorName": "旅行", "costType": "advance"}
  ],
  "exclusionRules": [
    {"id": 1, "majorName": "住宅", "minorName": "家賃"}
  ],
  "aliases": [
    {"memberId": 2, "alias": "はなこ"}
  ],
  "ratios": [
    {
      "householdId": 1,
      "effectiveMonth": "2025-01",
      "details": [
        {"memberId": 1, "percentage": "60"},
        {"memberId": 2, "percentage": "40"}
      ]
    }
  ],
  "transactions": [
    {"externalId": "MF-1", "date": "2025-01-05", "amount": -10000, "categoryId": 1},
    {"externalId": "MF-2", "date": "2025-01-06", "amount": -80000, "categoryId": 2},
    {"externalId": "MF-3", "date": "2025-01-10", "amount": -8000, "categoryId": 3},
    {"externalId": "MF-4", "date": "2025-01-12", "amount": -500, "categoryId": 1, "memo": "はなこ"},
    {"externalId": "MF-5", "date": "2025-01-15", "amount": -30000, "isTransfer": true}
  ]
}"#;

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(dir.path().join("data").join("household.json"), SNAPSHOT).unwrap();
    dir
}

fn warikan(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("warikan").unwrap();
    cmd.env("WARIKAN_DATA_DIR", dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_process_table() {
    let dir = setup();
    warikan(dir.path())
        .args(["process", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("按分_家計"))
        .stdout(predicate::str::contains("除外_ルール"))
        .stdout(predicate::str::contains("除外_個人"))
        .stdout(predicate::str::contains("¥6,000"))
        .stdout(predicate::str::contains("2 shared, 3 excluded, 0 failed"));

    assert!(!dir.path().join("results").join("shares-2025-01.json").exists());
}

#[test]
fn test_process_csv_export() {
    let dir = setup();
    let out = dir.path().join("shares.csv");
    warikan(dir.path())
        .args(["process", "--format", "csv", "--output"])
        .arg(&out)
        .assert()
        .success();

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("external_id,date,month,status"));
    assert!(csv.contains("MF-1,2025-01-05,2025-01"));
    assert!(csv.contains(",-3200,"));
}

#[test]
fn test_process_then_settle_from_saved_results() {
    let dir = setup();
    warikan(dir.path()).arg("process").assert().success();
    assert!(dir.path().join("results").join("shares-2025-01.json").exists());

    warikan(dir.path())
        .args(["settle", "2025-01", "--saved"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Settlement Report: 2025-01"))
        .stdout(predicate::str::contains("たろう"))
        .stdout(predicate::str::contains("¥3,200"));
}

#[test]
fn test_settle_csv() {
    let dir = setup();
    let out = dir.path().join("settle.csv");
    warikan(dir.path())
        .args(["settle", "2025-01", "-o"])
        .arg(&out)
        .assert()
        .success();

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.contains("2025-01,1,6000,8000,3200,0,3200"));
    assert!(csv.contains("2025-01,2,4000,0,0,3200,-3200"));
}

#[test]
fn test_classify() {
    let dir = setup();
    warikan(dir.path())
        .arg("classify")
        .assert()
        .success()
        .stdout(predicate::str::contains("按分_立替"))
        .stdout(predicate::str::contains("除外_振替"));
}

#[test]
fn test_ratio_check_reports_gap_and_invalid() {
    let dir = setup();
    let broken = SNAPSHOT
        .replace(r#""percentage": "40""#, r#""percentage": "30""#)
        .replace("2025-01-15", "2025-02-15")
        .replace(r#""amount": -30000, "isTransfer": true"#, r#""amount": -30000"#);
    fs::write(dir.path().join("data").join("household.json"), broken).unwrap();

    warikan(dir.path())
        .args(["ratio", "check"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid"))
        .stdout(predicate::str::contains("missing  2025-02"))
        .stderr(predicate::str::contains("failed validation"));
}

#[test]
fn test_ratio_apply_without_ratio_fails() {
    let dir = setup();
    let shifted = SNAPSHOT.replace("2025-01-05", "2025-03-05");
    fs::write(dir.path().join("data").join("household.json"), shifted).unwrap();

    warikan(dir.path())
        .args(["ratio", "apply", "2025-03"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No burden ratio configured for 2025-03"));
}

#[test]
fn test_override_set_and_save() {
    let dir = setup();
    let file = dir.path().join("overrides.json");
    fs::write(
        &file,
        r#"[{"externalId": "MF-1", "memberId": 2, "kind": "FIXED_AMOUNT", "value": 1000}]"#,
    )
    .unwrap();

    warikan(dir.path())
        .args(["override", "set", "MF-1", "--save", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("¥9,000"))
        .stdout(predicate::str::contains("(override)"));

    warikan(dir.path())
        .args(["override", "show", "MF-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FixedAmount"));
}

#[test]
fn test_override_overshoot_rejected() {
    let dir = setup();
    let file = dir.path().join("overrides.json");
    fs::write(
        &file,
        r#"[{"externalId": "MF-1", "memberId": 1, "kind": "FIXED_AMOUNT", "value": 20000}]"#,
    )
    .unwrap();

    warikan(dir.path())
        .args(["override", "set", "MF-1", "--file"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error on 'overrides'"));
}

#[test]
fn test_missing_snapshot() {
    let dir = TempDir::new().unwrap();
    warikan(dir.path())
        .arg("process")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Storage error"));
}

#[test]
fn test_init_and_config() {
    let dir = TempDir::new().unwrap();
    warikan(dir.path()).arg("init").assert().success();
    assert!(dir.path().join("config.json").exists());

    warikan(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Household:          household-1"))
        .stdout(predicate::str::contains("transfer > not_calculation_target"));
}
