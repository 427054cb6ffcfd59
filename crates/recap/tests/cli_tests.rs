use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_describes_the_tool() {
    Command::cargo_bin("recap")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("recording sessions"));
}

#[test]
fn record_help_lists_the_flags() {
    Command::cargo_bin("recap")
        .unwrap()
        .args(["record", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--duration"))
        .stdout(predicate::str::contains("--library-dir"));
}

#[test]
fn completions_emits_a_script() {
    Command::cargo_bin("recap")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recap"));
}

#[test]
fn missing_subcommand_is_an_error() {
    Command::cargo_bin("recap").unwrap().assert().failure();
}
