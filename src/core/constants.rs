//! Constants used throughout rollwave.
//!
//! Centralizes magic strings and configuration values.

/// Config file names searched in the working directory, in order.
pub const CONFIG_FILES: &[&str] = &["rollwave.toml", "rollwave.yml", "rollwave.yaml"];

/// Config file written by `rollwave init`.
pub const DEFAULT_CONFIG_FILE: &str = "rollwave.toml";

/// Manifest used when the config does not name one.
pub const DEFAULT_MANIFEST: &str = "docker-compose.yml";

/// Prefix and suffix of the generated manifest handed to the orchestrator.
pub const GENERATED_MANIFEST_PREFIX: &str = "docker-compose.rollwave.generated.";
pub const GENERATED_MANIFEST_SUFFIX: &str = ".yml";

/// Environment variables with this prefix are logical secrets.
pub const SECRET_ENV_PREFIX: &str = "ROLLWAVE_SECRET_";

/// Registry credentials used for `docker login`.
pub const REGISTRY_USER_VAR: &str = "ROLLWAVE_REGISTRY_USER";
pub const REGISTRY_PASSWORD_VAR: &str = "ROLLWAVE_REGISTRY_PASSWORD";

/// Dotenv file merged under the process environment.
pub const ENV_FILE: &str = ".env";

/// Build defaults when the manifest leaves them out.
pub const DEFAULT_BUILD_CONTEXT: &str = ".";
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// Hex characters of the content hash kept in a physical secret name.
pub const HASH_LEN: usize = 8;

/// Separator between the parts of a physical secret name.
pub const NAME_SEPARATOR: &str = "_";
