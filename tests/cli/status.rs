//! Tests for `rollwave status` and `rollwave completions`.

use crate::support::*;
use predicates::prelude::*;

#[cfg(unix)]
#[test]
fn test_status_of_empty_stack() {
    let t = Test::project(CONFIG, COMPOSE);
    let docker = t.fake_docker(&[]);

    let output = t.run_with_docker(&docker, &["status"], &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "Stack demo");
    assert_stdout_contains(&output, "no services running");
}

#[test]
fn test_completions_bash() {
    let t = Test::new();

    t.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rollwave").and(predicate::str::contains("deploy")));
}

#[test]
fn test_unknown_shell_rejected() {
    let t = Test::new();

    t.cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
