use std::io::Write;

use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;
use tempfile::NamedTempFile;

// `jobpool` with no flags runs the default workload.
#[test]
fn cli_default_run() {
    Command::cargo_bin("jobpool")
        .unwrap()
        .assert()
        .success()
        .stdout(contains("submitted:  1000"))
        .stdout(contains("executed:   1000"));
}

#[test]
fn cli_json_report() {
    Command::cargo_bin("jobpool")
        .unwrap()
        .args(["--threads", "2", "--capacity", "4", "--jobs", "50", "--json"])
        .assert()
        .success()
        .stdout(contains(r#""threads":2"#))
        .stdout(contains(r#""queue_capacity":4"#))
        .stdout(contains(r#""submitted":50"#))
        .stdout(contains(r#""executed":50"#));
}

#[test]
fn cli_jobs_with_work() {
    Command::cargo_bin("jobpool")
        .unwrap()
        .args(["--threads", "3", "--jobs", "30", "--work-us", "200"])
        .assert()
        .success()
        .stdout(contains("executed:   30"));
}

#[test]
fn cli_reads_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"threads": 3, "queue_capacity": 8}}"#).unwrap();

    Command::cargo_bin("jobpool")
        .unwrap()
        .args(["--jobs", "20", "--json", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(contains(r#""threads":3"#))
        .stdout(contains(r#""queue_capacity":8"#));
}

#[test]
fn cli_flags_override_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"threads": 3, "queue_capacity": 8}}"#).unwrap();

    Command::cargo_bin("jobpool")
        .unwrap()
        .args(["--jobs", "20", "--json", "--capacity", "2", "--config"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(contains(r#""threads":3"#))
        .stdout(contains(r#""queue_capacity":2"#));
}

#[test]
fn cli_zero_threads() {
    Command::cargo_bin("jobpool")
        .unwrap()
        .args(["--threads", "0"])
        .assert()
        .failure()
        .stderr(contains("Invalid thread count 0"));
}

#[test]
fn cli_zero_capacity() {
    Command::cargo_bin("jobpool")
        .unwrap()
        .args(["--capacity", "0"])
        .assert()
        .failure()
        .stderr(contains("Invalid queue capacity 0"));
}

#[test]
fn cli_missing_config_file() {
    Command::cargo_bin("jobpool")
        .unwrap()
        .args(["--config", "/nonexistent/jobpool.json"])
        .assert()
        .failure()
        .stderr(contains("IO error"));
}

#[test]
fn cli_invalid_flag() {
    Command::cargo_bin("jobpool")
        .unwrap()
        .args(["--threads", "many"])
        .assert()
        .failure();
}
