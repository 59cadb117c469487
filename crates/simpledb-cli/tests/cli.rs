//! End-to-end CLI integration tests for the `sdb` binary.
//!
//! Each test points `--db` at its own temporary directory and exercises the
//! `sdb` binary as a subprocess via `assert_cmd`.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Build a `Command` targeting the cargo-built `sdb` binary, rooted at `dir`.
fn sdb(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sdb").unwrap();
    cmd.arg("--db").arg(dir.path());
    cmd
}

#[test]
fn create_insert_select_one_shot() {
    let tmp = TempDir::new().unwrap();

    sdb(&tmp)
        .args(["-e", "CREATE TABLE users (id INTEGER PRIMARY KEY, email VARCHAR(255))"])
        .assert()
        .success();

    sdb(&tmp)
        .args(["-e", "INSERT INTO users (id, email) VALUES (1, 'a@b.com')"])
        .assert()
        .success();

    sdb(&tmp)
        .args(["-e", "SELECT * FROM users"])
        .assert()
        .success()
        .stdout(predicate::str::contains("a@b.com"));
}

#[test]
fn json_output_is_valid_json() {
    let tmp = TempDir::new().unwrap();

    sdb(&tmp)
        .args(["-e", "CREATE TABLE t (id INTEGER PRIMARY KEY)"])
        .assert()
        .success();

    let output = sdb(&tmp)
        .args(["-e", "INSERT INTO t (id) VALUES (1)", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["rows_affected"].as_i64().unwrap(), 1);

    let output = sdb(&tmp)
        .args(["-e", "SELECT * FROM t", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["rows"].as_array().unwrap().len(), 1);
}

#[test]
fn script_file_runs_statements_in_order() {
    let tmp = TempDir::new().unwrap();
    let script_path = tmp.path().join("setup.sql");
    std::fs::write(
        &script_path,
        "CREATE TABLE t (id INTEGER PRIMARY KEY, name VARCHAR(20));\n\
         INSERT INTO t (id, name) VALUES (1, 'a');\n\
         INSERT INTO t (id, name) VALUES (2, 'b');\n",
    )
    .unwrap();

    sdb(&tmp).args(["-f", script_path.to_str().unwrap()]).assert().success();

    sdb(&tmp)
        .args(["-e", "SELECT * FROM t"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 row"));
}

#[test]
fn syntax_error_exits_nonzero_and_reports_position() {
    let tmp = TempDir::new().unwrap();

    sdb(&tmp)
        .args(["-e", "SELEKT * FROM t"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn constraint_violation_exits_nonzero() {
    let tmp = TempDir::new().unwrap();

    sdb(&tmp)
        .args(["-e", "CREATE TABLE t (id INTEGER PRIMARY KEY)"])
        .assert()
        .success();
    sdb(&tmp).args(["-e", "INSERT INTO t (id) VALUES (1)"]).assert().success();

    sdb(&tmp)
        .args(["-e", "INSERT INTO t (id) VALUES (1)", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn reopening_db_dir_preserves_schema_and_data() {
    let tmp = TempDir::new().unwrap();

    sdb(&tmp)
        .args(["-e", "CREATE TABLE t (id INTEGER PRIMARY KEY)"])
        .assert()
        .success();
    sdb(&tmp).args(["-e", "INSERT INTO t (id) VALUES (1)"]).assert().success();

    // A fresh process, same --db dir, should see the prior table and row.
    sdb(&tmp)
        .args(["-e", "SELECT * FROM t"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 row"));
}
