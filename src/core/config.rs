//! Configuration file management.
//!
//! Handles reading `rollwave.toml` (or `rollwave.yml`), applying a named
//! environment overlay, and writing the starter template for `rollwave init`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::core::types::Variables;
use crate::error::{ConfigError, Result};

/// Project configuration as written on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Project identity
    #[serde(default)]
    pub project: String,
    /// Stack identity
    #[serde(default)]
    pub stack: Stack,
    /// Secret naming scope
    #[serde(default)]
    pub secrets: Secrets,
    /// Deploy toggles
    #[serde(default)]
    pub deploy: Deploy,
    /// Variables injected into the deploy invocation
    #[serde(default)]
    pub variables: Variables,
    /// Named environment overlays
    #[serde(default)]
    pub environments: BTreeMap<String, Overlay>,
}

/// Stack section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    /// Orchestrator stack name
    #[serde(default)]
    pub name: String,
    /// Path to the compose manifest
    #[serde(default)]
    pub compose_file: String,
}

/// Secrets section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Secrets {
    /// Extra scope inserted between the stack name and the secret key
    #[serde(default)]
    pub stack_prefix: String,
}

/// Deploy section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deploy {
    /// Sync secrets before deploying
    #[serde(default)]
    pub with_secrets: bool,
    /// Prune unused secrets after a successful deploy
    #[serde(default)]
    pub prune: bool,
}

/// Per-environment overrides.
///
/// Absent or empty fields inherit the base value. Booleans are tri-state so
/// an overlay can force a toggle off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<StackOverlay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<SecretsOverlay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy: Option<DeployOverlay>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: Variables,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compose_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretsOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployOverlay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_secrets: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prune: Option<bool>,
}

/// A fully resolved configuration.
///
/// Produced by [`Config::merge_with_env`]. It has no environments table, so
/// an overlay can never be applied twice.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub project: String,
    pub stack: Stack,
    pub secrets: Secrets,
    pub deploy: Deploy,
    pub variables: Variables,
    /// Name of the applied overlay, if any
    pub environment: Option<String>,
    /// Directory the config was loaded from; relative paths resolve against it
    pub base_dir: PathBuf,
}

impl Config {
    /// Locate the config file.
    ///
    /// An explicit path is returned as-is. Otherwise the first existing file
    /// of [`constants::CONFIG_FILES`] in `dir` wins.
    pub fn locate(explicit: Option<&Path>, dir: &Path) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        constants::CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
            .ok_or_else(|| {
                ConfigError::NotFound {
                    searched: constants::CONFIG_FILES.join(", "),
                }
                .into()
            })
    }

    /// Load configuration from a TOML or YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the file doesn't exist,
    /// `ConfigError::UnsupportedFormat` for an unknown extension, or
    /// `ConfigError::Parse` if the document is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");

        if !path.exists() {
            return Err(ConfigError::NotFound {
                searched: path.display().to_string(),
            }
            .into());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(path, &contents)?;

        debug!(
            stack = %config.stack.name,
            environments = config.environments.len(),
            variables = config.variables.len(),
            "config loaded"
        );

        Ok(config)
    }

    /// Parse config text, picking the format from the path's extension.
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let parse_err = |reason: String| ConfigError::Parse {
            path: path.to_path_buf(),
            reason,
        };
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config = match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_err(e.to_string()))?,
            "yml" | "yaml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_err(e.to_string()))?
            }
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf()).into()),
        };
        Ok(config)
    }

    /// Apply the named overlay and flatten into a [`Resolved`] config.
    ///
    /// With `env = None` the base values are used unchanged. Scalar fields are
    /// replaced only when the overlay sets a non-empty value; variables merge
    /// per key with the overlay winning.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownEnvironment` if `env` names no overlay.
    pub fn merge_with_env(&self, env: Option<&str>) -> Result<Resolved> {
        let mut resolved = Resolved {
            project: self.project.clone(),
            stack: self.stack.clone(),
            secrets: self.secrets.clone(),
            deploy: self.deploy.clone(),
            variables: self.variables.clone(),
            environment: None,
            base_dir: PathBuf::new(),
        };

        let Some(name) = env else {
            return Ok(resolved);
        };

        let overlay = self.environments.get(name).ok_or_else(|| {
            let available: Vec<&str> = self.environments.keys().map(String::as_str).collect();
            ConfigError::UnknownEnvironment {
                name: name.to_string(),
                available: if available.is_empty() {
                    "none".to_string()
                } else {
                    available.join(", ")
                },
            }
        })?;

        debug!(environment = name, "applying environment overlay");

        override_string(&mut resolved.project, overlay.project.as_ref());
        if let Some(stack) = &overlay.stack {
            override_string(&mut resolved.stack.name, stack.name.as_ref());
            override_string(&mut resolved.stack.compose_file, stack.compose_file.as_ref());
        }
        if let Some(secrets) = &overlay.secrets {
            override_string(&mut resolved.secrets.stack_prefix, secrets.stack_prefix.as_ref());
        }
        if let Some(deploy) = &overlay.deploy {
            if let Some(v) = deploy.with_secrets {
                resolved.deploy.with_secrets = v;
            }
            if let Some(v) = deploy.prune {
                resolved.deploy.prune = v;
            }
        }
        for (k, v) in &overlay.variables {
            resolved.variables.insert(k.clone(), v.clone());
        }

        resolved.environment = Some(name.to_string());
        Ok(resolved)
    }
}

fn override_string(base: &mut String, overlay: Option<&String>) {
    if let Some(value) = overlay {
        if !value.is_empty() {
            *base = value.clone();
        }
    }
}

impl Resolved {
    /// Attach the directory relative paths resolve against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Stack name, required by every command that talks to the cluster.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` if the name is empty.
    pub fn require_stack(&self) -> Result<&str> {
        if self.stack.name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "stack.name",
            }
            .into());
        }
        Ok(&self.stack.name)
    }

    /// Path to the compose manifest, defaulting to `docker-compose.yml`.
    pub fn manifest_path(&self) -> PathBuf {
        let file = if self.stack.compose_file.is_empty() {
            constants::DEFAULT_MANIFEST
        } else {
            self.stack.compose_file.as_str()
        };
        self.base_dir.join(file)
    }

    /// Extra secret scope, `None` when unset.
    pub fn secret_prefix(&self) -> Option<&str> {
        Some(self.secrets.stack_prefix.as_str()).filter(|p| !p.is_empty())
    }
}

/// Starter config written by `rollwave init`.
///
/// The project name is written as an escaped TOML string, so any name
/// round-trips.
pub fn template(project: &str) -> String {
    let quoted = toml::Value::String(project.to_string()).to_string();
    let staging = toml::Value::String(format!("{project}-staging")).to_string();
    format!(
        r#"project = {quoted}

[stack]
name = {quoted}
compose_file = "docker-compose.yml"

[secrets]
# Keeps secret names from clashing across stacks (e.g. prod, staging)
stack_prefix = "prod"

[deploy]
# Sync ROLLWAVE_SECRET_* variables into the cluster before deploying
with_secrets = true
prune = false

[variables]

# [environments.staging]
# stack = {{ name = {staging} }}
# secrets = {{ stack_prefix = "staging" }}
"#
    )
}

/// Write the starter config.
///
/// # Errors
///
/// Returns `ConfigError::AlreadyInitialized` if the file exists.
pub fn write_template(path: &Path, project: &str) -> Result<()> {
    if path.exists() {
        return Err(ConfigError::AlreadyInitialized(path.to_path_buf()).into());
    }
    std::fs::write(path, template(project))?;
    Ok(())
}
