//! Environment variable collection.
//!
//! Builds the explicit variable map the engine reads secrets and registry
//! credentials from. The process environment is layered over an optional
//! `.env` file, so the engine itself never touches global state.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

/// Parse a `.env` file into key/value pairs.
///
/// Quoting, escapes, `export ` prefixes and trailing comments follow the
/// usual dotenv rules.
///
/// # Errors
///
/// Returns `ConfigError::Parse` naming the file if it cannot be read or a
/// line is malformed.
pub fn load_dotenv(path: &Path) -> Result<BTreeMap<String, String>> {
    let parse_err = |e: dotenvy::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };
    let entries = dotenvy::from_path_iter(path)
        .map_err(parse_err)?
        .collect::<std::result::Result<BTreeMap<_, _>, _>>()
        .map_err(parse_err)?;
    Ok(entries)
}

/// The process environment, minus entries that are not valid UTF-8.
pub fn process_vars() -> Vec<(String, String)> {
    utf8_only(std::env::vars_os())
}

fn utf8_only<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (Ok(key), Err(_)) => {
                warn!(key = %key, "skipping environment variable with a non UTF-8 value");
                None
            }
            (Err(key), _) => {
                warn!(key = %key.to_string_lossy(), "skipping non UTF-8 environment variable");
                None
            }
        })
        .collect()
}

/// Layer process variables over an optional `.env` file.
///
/// Variables already present in `process` win, matching how dotenv loaders
/// never override the real environment.
///
/// # Errors
///
/// Returns error if the `.env` file exists but cannot be parsed.
pub fn collect<I>(process: I, dotenv: Option<&Path>) -> Result<BTreeMap<String, String>>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut vars = match dotenv {
        Some(path) if path.exists() => {
            let entries = load_dotenv(path)?;
            debug!(path = %path.display(), entries = entries.len(), "loaded dotenv file");
            entries
        }
        _ => BTreeMap::new(),
    };
    vars.extend(process);
    Ok(vars)
}
