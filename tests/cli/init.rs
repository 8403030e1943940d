//! Tests for `rollwave init`.

use crate::support::*;

#[test]
fn test_init_writes_template() {
    let t = Test::new();

    let output = t.init_cmd();
    assert_success(&output);
    assert_stdout_contains(&output, "created");

    let config = t.read("rollwave.toml");
    assert!(config.contains("[stack]"));
    assert!(config.contains("with_secrets = true"));
}

#[test]
fn test_init_template_is_loadable() {
    let t = Test::new();
    assert_success(&t.init_cmd());
    t.write("docker-compose.yml", "services:\n  web:\n    image: nginx\n");

    let output = t.deploy_dry_run(&["--no-secrets"], &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "nginx");
}

#[test]
fn test_init_twice_fails() {
    let t = Test::new();
    assert_success(&t.init_cmd());

    let output = t.init_cmd();
    assert_failure(&output);
    assert_stderr_contains(&output, "already exists");
}

#[test]
fn test_init_with_project_name() {
    let t = Test::new();

    let output = t.run(&["init", "--project", "shop"], &[]);
    assert_success(&output);
    assert!(t.read("rollwave.toml").contains("name = \"shop\""));
}

#[test]
fn test_init_project_name_with_quote_stays_valid() {
    let t = Test::new();
    assert_success(&t.run(&["init", "--project", "a\"b"], &[]));
    t.write("docker-compose.yml", "services:\n  web:\n    image: nginx\n");

    let output = t.deploy_dry_run(&["--no-secrets"], &[]);
    assert_success(&output);
}
