//! Config and collaborator resolution shared by the commands.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::cli::Globals;
use crate::core::cancel::Cancel;
use crate::core::config::{Config, Resolved};
use crate::core::constants::ENV_FILE;
use crate::core::env;
use crate::core::swarm::Docker;
use crate::error::Result;

/// Everything a command needs: resolved config, variables and cancellation.
pub struct Context {
    pub config: Resolved,
    /// Process environment layered over `.env`
    pub vars: BTreeMap<String, String>,
    pub cancel: Cancel,
    docker: String,
}

impl Context {
    /// Load the config file and apply the selected environment overlay.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no config is found, it cannot be parsed or
    /// the environment is unknown.
    pub fn load(globals: &Globals) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let path = Config::locate(globals.config.as_deref(), &cwd)?;
        let config = Config::load(&path)?
            .merge_with_env(globals.environment.as_deref())?
            .with_base_dir(base_dir(&path, &cwd));
        Self::build(globals, config, &cwd)
    }

    /// Like [`Context::load`], but a missing config file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a config exists but is invalid.
    pub fn load_optional(globals: &Globals) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        if globals.config.is_none() && Config::locate(None, &cwd).is_err() {
            debug!("no config file, using defaults");
            let config = Config::default()
                .merge_with_env(None)?
                .with_base_dir(&cwd);
            return Self::build(globals, config, &cwd);
        }
        Self::load(globals)
    }

    fn build(globals: &Globals, config: Resolved, cwd: &Path) -> Result<Self> {
        let vars = env::collect(env::process_vars(), Some(&cwd.join(ENV_FILE)))?;
        let cancel = match globals.timeout {
            Some(secs) => Cancel::with_timeout(Duration::from_secs(secs)),
            None => Cancel::new(),
        };
        Ok(Self {
            config,
            vars,
            cancel,
            docker: globals.docker.clone(),
        })
    }

    /// The docker backend, resolved on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns `DockerError::NotFound` if the binary is missing.
    pub fn docker(&self) -> Result<Docker> {
        Docker::locate(&self.docker)
    }

    /// A docker backend that is never invoked, for dry runs on machines
    /// without docker.
    pub fn offline_docker(&self) -> Docker {
        Docker::with_program(&self.docker)
    }
}

/// Directory the config lives in; relative paths resolve against it.
fn base_dir(config_path: &Path, cwd: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => cwd.join(parent),
        _ => cwd.to_path_buf(),
    }
}
