//! Exit codes and output channels of the `daydiff` binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn daydiff(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_daydiff"))
        .current_dir(dir)
        .env_remove("DAYDIFF_ENCODING")
        .env_remove("DAYDIFF_INVALID_ROWS")
        .env_remove("DAYDIFF_SKIP_HEADER")
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .expect("failed to launch daydiff")
}

fn write_days(dir: &Path, day1: &str, day2: &str) {
    fs::write(dir.join("day1.csv"), day1).unwrap();
    fs::write(dir.join("day2.csv"), day2).unwrap();
}

#[test]
fn prints_users_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write_days(dir.path(), "u2,p1,t\nu1,p1,t\n", "u1,p2,t\nu2,p3,t\n");

    let out = daydiff(dir.path(), &["run", "day1.csv", "day2.csv"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "u1\nu2\n");
}

#[test]
fn empty_result_is_success() {
    let dir = tempfile::tempdir().unwrap();
    write_days(dir.path(), "u1,p1,t\n", "u1,p1,t\n");

    let out = daydiff(dir.path(), &["run", "day1.csv", "day2.csv"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());
}

#[test]
fn output_flag_writes_file_not_stdout() {
    let dir = tempfile::tempdir().unwrap();
    write_days(dir.path(), "u1,p1,t\n", "u1,p2,t\n");

    let out = daydiff(dir.path(), &["run", "day1.csv", "day2.csv", "-o", "result.txt"]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    assert_eq!(fs::read_to_string(dir.path().join("result.txt")).unwrap(), "u1\n");
}

#[test]
fn missing_file_fails_with_path_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    write_days(dir.path(), "u1,p1,t\n", "u1,p2,t\n");

    let out = daydiff(dir.path(), &["run", "day1.csv", "absent.csv"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("absent.csv"));
}

#[test]
fn strict_malformed_row_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_days(dir.path(), "u1,p1,t\n", "u1,p1\nu1,p2,t\n");

    let out = daydiff(dir.path(), &["run", "day1.csv", "day2.csv"]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("day2.csv:1"), "{}", stderr);
}

#[test]
fn lenient_malformed_row_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    write_days(dir.path(), "u1,p1,t\n", "u1,p1\nu1,p2,t\n");

    let out = daydiff(
        dir.path(),
        &["run", "day1.csv", "day2.csv", "--invalid-rows", "lenient"],
    );
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "u1\n");
}

#[test]
fn policy_from_env() {
    let dir = tempfile::tempdir().unwrap();
    write_days(dir.path(), "u1,p1,t\n", "u1,p1\nu1,p2,t\n");

    let out = Command::new(env!("CARGO_BIN_EXE_daydiff"))
        .current_dir(dir.path())
        .env("DAYDIFF_INVALID_ROWS", "lenient")
        .env("RUST_LOG", "off")
        .args(["run", "day1.csv", "day2.csv"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "u1\n");
}

#[test]
fn unknown_encoding_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_days(dir.path(), "u1,p1,t\n", "u1,p2,t\n");

    let out = daydiff(
        dir.path(),
        &["run", "day1.csv", "day2.csv", "--encoding", "not-a-charset"],
    );
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("not-a-charset"));
}

#[test]
fn missing_arguments_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = daydiff(dir.path(), &["run", "day1.csv"]);
    assert!(!out.status.success());
}
