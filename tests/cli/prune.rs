//! Tests for `rollwave prune`.

#![cfg(unix)]

use crate::support::*;

const SEEDED: &[(&str, &str)] = &[
    ("s1", "demo_A_11111111"),
    ("s2", "demo_B_22222222"),
    ("s3", "other_C_33333333"),
];

#[test]
fn test_prune_empty_stack_deletes_scoped_secrets() {
    let t = Test::project(CONFIG, COMPOSE);
    let docker = t.fake_docker(SEEDED);

    let output = t.run_with_docker(&docker, &["prune"], &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "deleted demo_A_11111111");

    let removed: Vec<String> = t
        .docker_log()
        .into_iter()
        .filter(|l| l.starts_with("secret rm"))
        .collect();
    assert_eq!(removed, vec!["secret rm s1", "secret rm s2"]);
}

#[test]
fn test_prune_dry_run_deletes_nothing() {
    let t = Test::project(CONFIG, COMPOSE);
    let docker = t.fake_docker(SEEDED);

    let output = t.run_with_docker(&docker, &["prune", "--dry-run"], &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "demo_B_22222222 (would delete)");
    assert!(!t.docker_log().iter().any(|l| l.starts_with("secret rm")));
}

#[test]
fn test_prune_nothing_to_do() {
    let t = Test::project(CONFIG, COMPOSE);
    let docker = t.fake_docker(&[("s3", "other_C_33333333")]);

    let output = t.run_with_docker(&docker, &["prune"], &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "nothing to prune");
}
