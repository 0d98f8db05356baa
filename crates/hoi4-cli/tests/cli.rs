//! CLI integration tests using the pre-built binary

use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn workspace() -> TempDir {
    let dir = tempdir().unwrap();
    let states = dir.path().join("history/states");
    fs::create_dir_all(&states).unwrap();
    fs::write(
        states.join("1-Piedmont.txt"),
        "state={\n\tid = 1\n\tprovinces={\n\t\t5 7 9\n\t}\n}\n",
    )
    .unwrap();
    fs::write(
        states.join("2-Lombardy.txt"),
        "state={\n\tid = 2\n\tprovinces={\n\t\t3 4\n\t}\n}\n",
    )
    .unwrap();
    dir
}

fn cmd(root: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hoi4-states"));
    cmd.arg("--workspace").arg(root);
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hoi4-states"));
    cmd.arg("--help").assert().success();
}

#[test]
fn test_cli_scan() {
    let dir = workspace();
    cmd(dir.path())
        .arg("scan")
        .assert()
        .success()
        .stdout(contains("Found 2 states"))
        .stdout(contains("1-Piedmont.txt (3 provinces)"));
}

#[test]
fn test_cli_scan_json() {
    let dir = workspace();
    let output = cmd(dir.path()).args(["scan", "--json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["states"].as_array().unwrap().len(), 2);
    assert_eq!(json["states"][0]["id"], 1);
}

#[test]
fn test_cli_reassign() {
    let dir = workspace();
    cmd(dir.path())
        .args(["reassign", "--to", "2", "9", "5"])
        .assert()
        .success()
        .stdout(contains("Successfully reassigned provinces 9, 5 to state 2."));

    let states = dir.path().join("history/states");
    assert_eq!(
        fs::read_to_string(states.join("2-Lombardy.txt")).unwrap(),
        "state={\n\tid = 2\n\tprovinces={\n\t3 4 5 9\n}\n}\n"
    );
    assert_eq!(
        fs::read_to_string(states.join("1-Piedmont.txt")).unwrap(),
        "state={\n\tid = 1\n\tprovinces={\n\t7\n}\n}\n"
    );
}

#[cfg(unix)]
#[test]
fn test_cli_reassign_warns_about_unread_files() {
    let dir = workspace();
    let states = dir.path().join("history/states");
    std::os::unix::fs::symlink(states.join("gone"), states.join("3-Veneto.txt")).unwrap();

    cmd(dir.path())
        .args(["reassign", "--to", "2", "9"])
        .assert()
        .success()
        .stdout(contains("1 state file(s) could not be read"))
        .stdout(contains("3-Veneto.txt"));
}

#[test]
fn test_cli_reassign_dry_run() {
    let dir = workspace();
    let before = fs::read_to_string(dir.path().join("history/states/1-Piedmont.txt")).unwrap();

    cmd(dir.path())
        .args(["reassign", "--to", "2", "--dry-run", "9"])
        .assert()
        .success()
        .stdout(contains("State 1 loses: 9"));

    let after = fs::read_to_string(dir.path().join("history/states/1-Piedmont.txt")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_cli_reassign_unknown_target() {
    let dir = workspace();
    cmd(dir.path())
        .args(["reassign", "--to", "999", "5"])
        .assert()
        .failure()
        .stderr(contains("could not find a state file for state ID 999"));
}

#[test]
fn test_cli_reassign_invalid_province() {
    let dir = workspace();
    cmd(dir.path())
        .args(["reassign", "--to", "2", "abc"])
        .assert()
        .failure()
        .stderr(contains("invalid input"));
}

#[test]
fn test_cli_missing_states_directory() {
    let dir = tempdir().unwrap();
    cmd(dir.path())
        .arg("next-id")
        .assert()
        .failure()
        .stderr(contains("does not exist"));
}

#[test]
fn test_cli_next_id() {
    let dir = workspace();
    cmd(dir.path())
        .arg("next-id")
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn test_cli_create_state() {
    let dir = workspace();
    cmd(dir.path())
        .args([
            "create-state",
            "--name",
            "Gerald",
            "--category",
            "town",
            "--owner",
            "ITA",
            "--core",
            "ITA",
            "--core",
            "GER",
            "7",
            "3",
        ])
        .assert()
        .success()
        .stdout(contains("Created state 3 \"Gerald\""));

    let states = dir.path().join("history/states");
    let created = fs::read_to_string(states.join("3-NewState.txt")).unwrap();
    assert!(created.contains("\t\tadd_core_of = ITA\n\t\tadd_core_of = GER\n"));
    assert!(created.contains("provinces={\n\t3 7\n}"));

    let loc = fs::read_to_string(dir.path().join("localisation/state_names_l_english.yml")).unwrap();
    assert_eq!(loc, "l_english:\n STATE_3:0 \"Gerald\"\n");

    assert_eq!(
        fs::read_to_string(states.join("2-Lombardy.txt")).unwrap(),
        "state={\n\tid = 2\n\tprovinces={\n\t4\n}\n}\n"
    );
}

#[test]
fn test_cli_create_state_rejects_bad_tag() {
    let dir = workspace();
    cmd(dir.path())
        .args([
            "create-state",
            "--name",
            "Gerald",
            "--category",
            "town",
            "--owner",
            "italy",
            "7",
        ])
        .assert()
        .failure()
        .stderr(contains("invalid tag 'italy'"));

    assert!(!dir.path().join("history/states/3-NewState.txt").exists());
}

#[test]
fn test_cli_check_reports_contested() {
    let dir = workspace();
    fs::write(
        dir.path().join("history/states/3-Veneto.txt"),
        "state={ id = 3 provinces={ 4 11 } }",
    )
    .unwrap();

    cmd(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stdout(contains("4: states 2, 3"));
}

#[test]
fn test_cli_init_config() {
    let dir = workspace();
    cmd(dir.path()).arg("init-config").assert().success();

    let content = fs::read_to_string(dir.path().join("hoi4-states.json")).unwrap();
    assert!(content.contains("\"statesDirectory\": \"history/states\""));
}
