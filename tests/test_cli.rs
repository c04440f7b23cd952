use assert_cmd::prelude::*;
use predicates::prelude::*;

use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn edfsim() -> Command {
    Command::cargo_bin("edfsim").expect("Calling binary failed")
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("edfsim-cli-tests");
    fs::create_dir_all(&dir).expect("creating scratch dir failed");
    dir.join(name)
}

#[test]
fn no_args_fails() {
    edfsim().assert().failure();
}

#[test]
fn version() {
    edfsim().arg("--version").assert().stdout("edfsim 0.1.0\n");
}

#[test]
fn run_reports_end_of_simulation_and_dumps_state() {
    let prefix = scratch("simple");
    edfsim()
        .arg("run")
        .arg("-j")
        .arg(fixture("ts-simple.json"))
        .args(&["-t", "7", "-w", "1", "-z", "978382"])
        .arg("-n")
        .arg(&prefix)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "7: End of simulation with 1 events servicing 1 jobs",
        ));

    let dump = fs::read_to_string(format!("{}_dump.json", prefix.display())).unwrap();
    assert_eq!(dump, r#"{"now":7,"jobs":[[19,14,18,21,3]]}"#);
}

#[test]
fn zero_break_time_passes() {
    let prefix = scratch("pass");
    edfsim()
        .arg("run")
        .arg("-j")
        .arg(fixture("ts-simple.json"))
        .args(&["-t", "0"])
        .arg("-n")
        .arg(&prefix)
        .assert()
        .success()
        .stdout(predicate::str::contains("0: Pass simulation"));
}

#[test]
fn overloaded_system_reports_a_deadline_miss() {
    let prefix = scratch("overload");
    edfsim()
        .arg("run")
        .arg("-j")
        .arg(fixture("ts-overload.json"))
        .args(&["-t", "9273"])
        .arg("-n")
        .arg(&prefix)
        .assert()
        .success()
        .stdout(predicate::str::contains("4: Deadline miss after"));
}

#[test]
fn resume_continues_from_a_dump() {
    let first = scratch("stage1");
    edfsim()
        .arg("run")
        .arg("-j")
        .arg(fixture("ts-simple.json"))
        .args(&["-t", "100", "-z", "978382"])
        .arg("-n")
        .arg(&first)
        .assert()
        .success()
        .stdout(predicate::str::contains("100: End of simulation"));

    let second = scratch("stage2");
    edfsim()
        .arg("run")
        .arg("-j")
        .arg(fixture("ts-simple.json"))
        .arg("-r")
        .arg(format!("{}_dump.json", first.display()))
        .args(&["-t", "200"])
        .arg("-n")
        .arg(&second)
        .assert()
        .success()
        .stdout(predicate::str::contains("200: End of simulation"));
}

#[test]
fn config_command_shows_defaults() {
    edfsim()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("break_time: 60000"));
}
