//! Tests for `rollwave deploy`.

use crate::support::*;

const SECRET: (&str, &str) = ("ROLLWAVE_SECRET_DB_PASSWORD", "abc123");

#[test]
fn test_dry_run_rewrites_secrets() {
    let t = Test::project(CONFIG, COMPOSE);

    let output = t.deploy_dry_run(&[], &[SECRET]);
    assert_success(&output);

    let doc = stdout_yaml(&output);
    let decl = &doc["secrets"]["DB_PASSWORD"];
    assert_eq!(decl["name"].as_str(), Some(DB_PASSWORD_NAME));
    assert_eq!(decl["external"].as_bool(), Some(true));
    assert!(decl.get("file").is_none());
    assert_eq!(doc["networks"]["default"]["driver"].as_str(), Some("overlay"));
}

#[test]
fn test_dry_run_with_build_uses_tag() {
    let t = Test::project(CONFIG, COMPOSE);

    let output = t.deploy_dry_run(&["--build", "--tag", "abc1234"], &[SECRET]);
    assert_success(&output);

    let doc = stdout_yaml(&output);
    let web = &doc["services"]["web"];
    assert_eq!(web["image"].as_str(), Some("registry.example/web:abc1234"));
    assert!(web.get("build").is_none());
}

#[test]
fn test_dry_run_without_build_keeps_build_section() {
    let t = Test::project(CONFIG, COMPOSE);

    let output = t.deploy_dry_run(&[], &[SECRET]);
    assert_success(&output);

    let doc = stdout_yaml(&output);
    assert_eq!(doc["services"]["web"]["build"].as_str(), Some("."));
}

#[test]
fn test_no_secrets_flag_overrides_config() {
    let t = Test::project(CONFIG, COMPOSE);

    let output = t.deploy_dry_run(&["--no-secrets"], &[SECRET]);
    assert_success(&output);
    assert_stdout_contains(&output, "./db.txt");
    assert_stdout_excludes(&output, DB_PASSWORD_NAME);
}

#[test]
fn test_environment_overlay_changes_names() {
    let t = Test::project(CONFIG, COMPOSE);

    let output = t.deploy_dry_run(&["-e", "staging"], &[SECRET]);
    assert_success(&output);
    assert_stdout_contains(&output, "demo-staging_stg_DB_PASSWORD_6ca13d52");
}

#[test]
fn test_process_env_wins_over_dotenv() {
    let t = Test::project(CONFIG, COMPOSE);
    t.write(".env", "ROLLWAVE_SECRET_DB_PASSWORD=from-dotenv\n");

    let output = t.deploy_dry_run(&[], &[SECRET]);
    assert_success(&output);
    assert_stdout_contains(&output, DB_PASSWORD_NAME);
}

#[test]
fn test_dotenv_supplies_secrets() {
    let t = Test::project(CONFIG, COMPOSE);
    t.write(".env", "ROLLWAVE_SECRET_DB_PASSWORD=abc123\n");

    let output = t.deploy_dry_run(&[], &[]);
    assert_success(&output);
    assert_stdout_contains(&output, DB_PASSWORD_NAME);
}

#[test]
fn test_empty_secret_value_fails() {
    let t = Test::project(CONFIG, COMPOSE);

    let output = t.deploy_dry_run(&[], &[("ROLLWAVE_SECRET_DB_PASSWORD", "")]);
    assert_failure(&output);
    assert_stderr_contains(&output, "DB_PASSWORD has an empty value");
}

#[test]
fn test_unknown_environment_fails() {
    let t = Test::project(CONFIG, COMPOSE);

    let output = t.deploy_dry_run(&["-e", "production"], &[SECRET]);
    assert_failure(&output);
    assert_stderr_contains(&output, "unknown environment 'production'");
    assert_stderr_contains(&output, "staging");
}

#[test]
fn test_build_without_image_fails() {
    let t = Test::project(CONFIG, "services:\n  api:\n    build: ./api\n");

    let output = t.deploy_dry_run(&["--build"], &[SECRET]);
    assert_failure(&output);
    assert_stderr_contains(&output, "service 'api' has a build section but no image name");
}

#[test]
fn test_with_and_no_secrets_conflict() {
    let t = Test::project(CONFIG, COMPOSE);

    let output = t.deploy_dry_run(&["--with-secrets", "--no-secrets"], &[]);
    assert_failure(&output);
}

#[cfg(unix)]
#[test]
fn test_deploy_drives_docker() {
    let t = Test::project(CONFIG, COMPOSE);
    let docker = t.fake_docker(&[]);

    let output = t.run_with_docker(&docker, &["deploy"], &[SECRET]);
    assert_success(&output);
    assert_stdout_contains(&output, "deployed stack");

    let log = t.docker_log();
    assert!(log
        .iter()
        .any(|l| l == &format!("secret create {} -", DB_PASSWORD_NAME)));
    let deploy = log
        .iter()
        .find(|l| l.starts_with("stack deploy --compose-file"))
        .expect("no stack deploy call");
    assert!(deploy.contains("docker-compose.rollwave.generated."));
    assert!(deploy.ends_with("--with-registry-auth --prune demo"));
    assert!(log.iter().any(|l| l == "APP_ENV=base"));
    assert!(!log.iter().any(|l| l.starts_with("build")));

    assert!(t
        .files_with_prefix("docker-compose.rollwave.generated.")
        .is_empty());
}

#[cfg(unix)]
#[test]
fn test_deploy_skips_existing_secret() {
    let t = Test::project(CONFIG, COMPOSE);
    let docker = t.fake_docker(&[("s1", DB_PASSWORD_NAME)]);

    let output = t.run_with_docker(&docker, &["deploy"], &[SECRET]);
    assert_success(&output);
    assert!(!t
        .docker_log()
        .iter()
        .any(|l| l.starts_with("secret create")));
}

#[cfg(unix)]
#[test]
fn test_deploy_logs_in_to_registry() {
    let t = Test::project(CONFIG, COMPOSE);
    let docker = t.fake_docker(&[]);

    let output = t.run_with_docker(
        &docker,
        &["deploy", "--no-secrets"],
        &[
            ("ROLLWAVE_REGISTRY_USER", "deployer"),
            ("ROLLWAVE_REGISTRY_PASSWORD", "hunter2"),
        ],
    );
    assert_success(&output);

    let log = t.docker_log();
    assert_eq!(log[0], "login -u deployer --password-stdin registry.example");
    assert!(!log.iter().any(|l| l.contains("hunter2")));
}
