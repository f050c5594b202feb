//! Command-line behavior of the `helpline` binary

use assert_cmd::Command;
use predicates::prelude::*;

mod common;
use common::{temp_config_file, temp_file, VALID_MESSAGE};

fn helpline() -> Command {
    let mut cmd = Command::cargo_bin("helpline").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("HELPLINE_SEED")
        .env_remove("HELPLINE_SPEED")
        .env_remove("HELPLINE_DEFAULT_NAME")
        .env_remove("HELPLINE_ROSTER")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version() {
    helpline().arg("--version").assert().success();
}

#[test]
fn test_simulate_prints_timeline() {
    helpline()
        .args(["simulate", "--seed", "4", "--message", VALID_MESSAGE])
        .assert()
        .success()
        .stdout(predicate::str::contains("[00:01] Din chatanmodning er sendt."))
        .stdout(predicate::str::contains("Det er snart din tur!"))
        .stdout(predicate::str::contains("Hej Anonym! Velkommen til Børnetelefonen."));
}

#[test]
fn test_simulate_json_output_parses() {
    let output = helpline()
        .args(["simulate", "--json", "--seed", "9", "-n", "Ida", "-m", VALID_MESSAGE])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["final"]["chat_state"], "chatting");
    assert_eq!(json["final"]["display_name"], "Ida");
    let timeline = json["timeline"].as_array().unwrap();
    assert_eq!(timeline.first().unwrap()["type"], "submitted");
    assert_eq!(timeline.last().unwrap()["type"], "message");
}

#[test]
fn test_simulate_rejects_short_message() {
    helpline()
        .args(["simulate", "--message", "Hej"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Din besked skal være mindst 10 bogstaver lang",
        ));
}

#[test]
fn test_callback_specific_slot() {
    helpline()
        .args(["callback", "-p", "12345678", "-t", "specific", "-s", "15-18"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vi ringer dig op 15-18"));
}

#[test]
fn test_callback_without_slot_fails() {
    helpline()
        .args(["callback", "--phone", "12345678", "--time", "specific"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Vælg venligst et specifikt tidspunkt"));
}

#[test]
fn test_callback_unknown_time_fails() {
    helpline()
        .args(["callback", "--phone", "12345678", "--time", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown preferred time: soon"));
}

#[test]
fn test_roster_lists_counselors_and_moods() {
    helpline()
        .arg("roster")
        .assert()
        .success()
        .stdout(predicate::str::contains("Maria"))
        .stdout(predicate::str::contains("Alexander"))
        .stdout(predicate::str::contains("Overvældet"));
}

#[test]
fn test_roster_file_override() {
    let (_dir, path) = temp_file(
        "roster.yaml",
        "counselors:\n  - id: 7\n    name: Frida\n    gender: female\n    avatar: https://example.org/frida.svg\n",
    );
    helpline()
        .args(["--roster", path.to_str().unwrap(), "roster"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Frida"))
        .stdout(predicate::str::contains("Maria").not());
}

#[test]
fn test_tip_is_deterministic_with_seed() {
    let first = helpline().args(["tip", "--seed", "3"]).output().unwrap();
    let second = helpline().args(["tip", "--seed", "3"]).output().unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert!(String::from_utf8_lossy(&first.stdout).contains("Dagens tip:"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let (_dir, path) = temp_config_file("timing:\n  queue_steps: 0\n");
    helpline()
        .arg("--config")
        .arg(path)
        .arg("tip")
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be greater than 0"));
}

#[test]
fn test_config_default_name_used_in_welcome() {
    let (_dir, path) = temp_config_file("session:\n  default_name: Gæst\n  seed: 1\n");
    helpline()
        .arg("--config")
        .arg(path)
        .args(["simulate", "-m", VALID_MESSAGE])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hej Gæst!"));
}
