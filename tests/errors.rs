mod common;

use common::bft;
use predicates::prelude::*;
use std::time::Duration;

#[test]
fn unmatched_open_bracket_is_reported_with_position() {
    bft().cmd
        .timeout(Duration::from_secs(2))
        .args(["run", "+[+"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("Parse error: unmatched bracket '['")
                .and(predicate::str::contains("at instruction 1"))
                .and(predicate::str::contains("   ^")),
        );
}

#[test]
fn unmatched_close_bracket_is_reported_with_position() {
    bft().cmd
        .args(["run", "++]"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("Parse error: unmatched bracket ']'")
                .and(predicate::str::contains("at instruction 2")),
        );
}

#[test]
fn validation_failure_runs_nothing() {
    // The '.' before the stray bracket never executes.
    bft().cmd
        .args(["run", "+.]"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn exhausted_input_keeps_partial_output() {
    bft().cmd
        .timeout(Duration::from_secs(2))
        .args(["run", "+.,."])
        .write_stdin("")
        .assert()
        .code(1)
        .stdout("\u{1}")
        .stderr(
            predicate::str::contains("Runtime error: input exhausted")
                .and(predicate::str::contains("at instruction 2")),
        );
}

#[test]
fn check_counts_loops() {
    bft().cmd
        .args(["check", ">++++[<+++++>-]<[-]"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ok: 2 loop(s)"));
}

#[test]
fn check_reports_unmatched_bracket() {
    bft().cmd
        .args(["check", "[[]"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("unmatched bracket '['")
                .and(predicate::str::contains("at instruction 0")),
        );
}
