//! Tests for `rollwave secrets`.

use crate::support::*;

#[test]
fn test_list_masks_values() {
    let t = Test::new();

    let output = t.run(
        &["secrets", "list"],
        &[
            ("ROLLWAVE_SECRET_DB_PASSWORD", "abc123"),
            ("ROLLWAVE_SECRET_API_TOKEN", "t0k3n-value"),
            ("UNRELATED", "x"),
        ],
    );
    assert_success(&output);
    assert_stdout_contains(&output, "API_TOKEN=**** (len=11)");
    assert_stdout_contains(&output, "DB_PASSWORD=**** (len=6)");
    assert_stdout_excludes(&output, "abc123");
    assert_stdout_excludes(&output, "UNRELATED");
}

#[test]
fn test_list_json() {
    let t = Test::new();

    let output = t.run(
        &["secrets", "list", "--json"],
        &[("ROLLWAVE_SECRET_DB_PASSWORD", "abc123")],
    );
    assert_success(&output);

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed[0]["key"], "DB_PASSWORD");
    assert_eq!(parsed[0]["length"], 6);
    assert_stdout_excludes(&output, "abc123");
}

#[test]
fn test_list_empty() {
    let t = Test::new();

    let output = t.run(&["secrets", "list"], &[]);
    assert_success(&output);
    assert_stdout_contains(&output, "no ROLLWAVE_SECRET_* variables set");
}

#[test]
fn test_sync_dry_run_without_config() {
    let t = Test::new();

    let output = t.run(
        &["secrets", "sync", "--stack", "demo", "--dry-run"],
        &[("ROLLWAVE_SECRET_DB_PASSWORD", "abc123")],
    );
    assert_success(&output);
    assert_stdout_contains(&output, DB_PASSWORD_NAME);
}

#[test]
fn test_swarm_alias_with_prefix() {
    let t = Test::new();

    let output = t.run(
        &["secrets", "swarm", "--stack", "demo", "--prefix", "prod", "--dry-run"],
        &[("ROLLWAVE_SECRET_DB_PASSWORD", "abc123")],
    );
    assert_success(&output);
    assert_stdout_contains(&output, "demo_prod_DB_PASSWORD_6ca13d52");
}

#[test]
fn test_sync_without_stack_needs_config() {
    let t = Test::new();

    let output = t.run(&["secrets", "sync", "--dry-run"], &[]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no config file found");
}

#[cfg(unix)]
#[test]
fn test_sync_creates_missing_only() {
    let t = Test::project(CONFIG, COMPOSE);
    let docker = t.fake_docker(&[("s1", DB_PASSWORD_NAME)]);

    let output = t.run_with_docker(
        &docker,
        &["secrets", "sync"],
        &[
            ("ROLLWAVE_SECRET_DB_PASSWORD", "abc123"),
            ("ROLLWAVE_SECRET_API_TOKEN", "t0k3n"),
        ],
    );
    assert_success(&output);

    let creates: Vec<String> = t
        .docker_log()
        .into_iter()
        .filter(|l| l.starts_with("secret create"))
        .collect();
    assert_eq!(creates.len(), 1);
    assert!(creates[0].starts_with("secret create demo_API_TOKEN_"));
}

#[cfg(unix)]
#[test]
fn test_list_ignores_non_utf8_variables() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let t = Test::new();

    let output = t
        .cmd()
        .args(["secrets", "list"])
        .env("WEIRD", OsStr::from_bytes(b"\xff\xfe"))
        .env("ROLLWAVE_SECRET_A", "x")
        .output()
        .unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "A=**** (len=1)");
}

#[test]
fn test_dotenv_trailing_comment_not_in_secret() {
    let t = Test::new();
    t.write(".env", "ROLLWAVE_SECRET_DB_PASSWORD=\"abc123\" # rotated\n");

    let output = t.run(&["secrets", "sync", "--stack", "demo", "--dry-run"], &[]);
    assert_success(&output);
    assert_stdout_contains(&output, DB_PASSWORD_NAME);
}
