//! Error reporting tests.

use crate::support::*;

#[test]
fn test_missing_config_suggests_init() {
    let t = Test::new();

    let output = t.run(&["deploy", "--dry-run"], &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no config file found");
    assert_stderr_contains(&output, "rollwave init");
}

#[test]
fn test_missing_stack_name() {
    let t = Test::project("project = \"demo\"\n", COMPOSE);

    let output = t.run(&["deploy", "--dry-run"], &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "missing required field: stack.name");
}

#[test]
fn test_unsupported_config_format() {
    let t = Test::new();
    t.write("rollwave.json", "{}");

    let output = t.run(&["-c", "rollwave.json", "status"], &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "unsupported config format");
}

#[test]
fn test_malformed_manifest() {
    let t = Test::project(CONFIG, "services: [unclosed\n");

    let output = t.run(&["deploy", "--dry-run"], &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse manifest");
}

#[test]
fn test_missing_docker_binary() {
    let t = Test::project(CONFIG, COMPOSE);

    let output = t.run(&["--docker", "/nonexistent/docker", "status"], &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "docker CLI not found");
}

#[test]
fn test_yaml_config_is_accepted() {
    let t = Test::new();
    t.write("rollwave.yml", "stack:\n  name: demo\n");
    t.write("docker-compose.yml", "services:\n  web:\n    image: nginx\n");

    let output = t.run(&["deploy", "--dry-run"], &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "nginx");
}
