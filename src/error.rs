//! Error types.
//!
//! Each stage of a run has its own error enum; all of them fold into
//! [`Error`] so handlers can use `?` freely.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Deploy(#[from] DeployError),

    #[error(transparent)]
    Prune(#[from] PruneError),

    #[error(transparent)]
    Docker(#[from] DockerError),

    #[error("operation cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Re-wrap an error with caller context, keeping cancellation intact.
    ///
    /// A cancelled run must surface as [`Error::Cancelled`] no matter which
    /// stage noticed it, so only other errors are handed to `wrap`.
    pub fn context<F>(self, wrap: F) -> Error
    where
        F: FnOnce(String) -> Error,
    {
        match self {
            Error::Cancelled => Error::Cancelled,
            other => wrap(other.to_string()),
        }
    }

    /// Whether this error is a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Configuration loading and resolution errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no config file found (looked for {searched})")]
    NotFound { searched: String },

    #[error("config file already exists: {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("unsupported config format: {} (expected .toml, .yml or .yaml)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("unknown environment '{name}' (available: {available})")]
    UnknownEnvironment { name: String, available: String },

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}

/// Manifest parse and rewrite errors.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("service '{service}' has a build section but no image name (required for push)")]
    MissingImage { service: String },
}

/// Image build, push and registry errors.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("build service {service}: {reason}")]
    Failed { service: String, reason: String },

    #[error("registry login to {registry} failed: {reason}")]
    Login { registry: String, reason: String },
}

/// Secret versioning errors.
#[derive(Error, Debug)]
pub enum SecretError {
    #[error("secret {0} has an empty value")]
    EmptyValue(String),

    #[error("failed to create secret {name}: {reason}")]
    CreateFailed { name: String, reason: String },

    #[error("failed to check secret {name}: {reason}")]
    Lookup { name: String, reason: String },
}

/// Deploy driver errors.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("failed to write generated manifest in {}: {source}", dir.display())]
    Write {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("deploy of stack '{stack}' failed: {reason}")]
    Rejected { stack: String, reason: String },
}

/// Prune listing errors.
///
/// Individual delete failures are not errors; they are recorded in the
/// prune report instead.
#[derive(Error, Debug)]
pub enum PruneError {
    #[error("list secrets for stack '{stack}': {reason}")]
    ListSecrets { stack: String, reason: String },

    #[error("list services for stack '{stack}': {reason}")]
    ListServices { stack: String, reason: String },

    #[error("inspect service {service}: {reason}")]
    InspectService { service: String, reason: String },
}

/// Failures of the external docker CLI.
#[derive(Error, Debug)]
pub enum DockerError {
    #[error("docker CLI not found: {program}")]
    NotFound { program: String },

    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("unexpected output from {command}: {reason}")]
    Parse { command: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
