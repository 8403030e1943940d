//! Test support utilities for rollwave integration tests.
//!
//! Provides an isolated project directory, file writers and a scripted
//! stand-in for the docker CLI.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;

use tempfile::TempDir;

/// Test environment with an isolated project directory.
///
/// Child processes run with `.current_dir()` and a cleared environment, so
/// tests can run in parallel and never see the developer's variables.
pub struct Test {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl Test {
    /// Create an empty project.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Project with `rollwave.toml` and `docker-compose.yml` in place.
    pub fn project(config: &str, compose: &str) -> Self {
        let t = Self::new();
        t.write("rollwave.toml", config);
        t.write("docker-compose.yml", compose);
        t
    }

    /// Write a file relative to the project directory.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("failed to write file");
        path
    }

    /// Read a file relative to the project directory.
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("failed to read file")
    }

    /// Files in the project directory whose name starts with `prefix`.
    pub fn files_with_prefix(&self, prefix: &str) -> Vec<String> {
        std::fs::read_dir(self.dir.path())
            .expect("failed to read project dir")
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(prefix))
            .collect()
    }

    /// Install the fake docker script and return its path.
    ///
    /// `secrets` seeds `docker secret ls` output; every invocation is
    /// appended to `docker.log` in the project directory.
    #[cfg(unix)]
    pub fn fake_docker(&self, secrets: &[(&str, &str)]) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let listing: String = secrets
            .iter()
            .map(|(id, name)| format!("{{\"ID\":\"{}\",\"Name\":\"{}\"}}\n", id, name))
            .collect();
        self.write("docker-secrets.jsonl", &listing);

        let path = self.write("fake-docker", FAKE_DOCKER);
        let mut perms = std::fs::metadata(&path).expect("stat fake docker").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod fake docker");
        path
    }

    /// Invocations recorded by the fake docker, one per line.
    pub fn docker_log(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("docker.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}
