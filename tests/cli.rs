//! End-to-end tests driving the compiled `fragment` binary, grounded in
//! the CLI test style from the pack's `faxc-drv` crate.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn fragment_cmd() -> Command {
    Command::cargo_bin("fragment").unwrap()
}

fn source_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp source file");
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn runs_arithmetic_program() {
    let file = source_file("(+ 1 2)");
    fragment_cmd().arg(file.path()).assert().success();
}

#[test]
fn define_then_println_writes_value_with_newline() {
    let file = source_file("(define x 5) (println x)");
    fragment_cmd()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::eq("5\n"));
}

#[test]
fn factorial_program_runs_to_completion() {
    let file = source_file(
        "(define fact (lambda (n) (if (<= n 1) 1 (* n (fact (- n 1)))))) \
         (println (fact 5))",
    );
    fragment_cmd()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::eq("120\n"));
}

#[test]
fn greet_program_concatenates_strings() {
    let file = source_file(
        "(define greet (lambda (who) (+ \"hello \" who))) (println (greet \"world\"))",
    );
    fragment_cmd()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::eq("hello world\n"));
}

#[test]
fn undefined_reference_exits_failure_with_invalid_state_diagnostic() {
    let file = source_file("(this_is_not_defined)");
    fragment_cmd()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("invalid_state\n"))
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("position:"));
}

#[test]
fn unclosed_block_exits_failure_with_invalid_block_diagnostic() {
    let file = source_file("(+ 1 2");
    fragment_cmd()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("invalid_block\n"));
}

#[test]
fn missing_source_file_exits_failure_with_io_diagnostic() {
    fragment_cmd()
        .arg("/no/such/fragment/source/file.fr")
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("io_failure\n"));
}

#[test]
fn missing_positional_file_argument_exits_failure() {
    fragment_cmd().assert().failure();
}

#[test]
fn version_flag_prints_version_and_exits_success() {
    fragment_cmd().arg("-v").assert().success();
}

#[test]
fn help_flag_prints_usage_and_exits_success() {
    fragment_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}
