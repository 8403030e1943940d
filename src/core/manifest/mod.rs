//! Compose manifest model.
//!
//! A typed view of the parts of a compose document rollwave rewrites:
//! per-service `image` and `build`, and the top-level `secrets` table.
//! Every other key is kept verbatim in a passthrough bag, so networks,
//! volumes, `x-` extensions and unknown service keys survive a rewrite.

mod rewrite;

pub use rewrite::{extract_build_specs, replace_images, rewrite_secrets, unmatched_secrets};

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::error::{ManifestError, Result};

/// Unmodelled keys, kept as-is.
pub type Passthrough = BTreeMap<String, Value>;

/// A compose document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<BTreeMap<String, Service>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<BTreeMap<String, Option<SecretDecl>>>,
    #[serde(flatten)]
    pub extra: Passthrough,
}

/// One service definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<Build>,
    #[serde(flatten)]
    pub extra: Passthrough,
}

/// `build:` is either a bare context path or an options table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Build {
    Context(String),
    Options(BuildOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<String>,
    #[serde(flatten)]
    pub extra: Passthrough,
}

/// A top-level secret declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecretDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Value>,
    #[serde(flatten)]
    pub extra: Passthrough,
}

impl Manifest {
    /// Parse a compose document.
    ///
    /// # Errors
    ///
    /// Merge keys (`<<: *anchor`) are resolved first, so services that pull
    /// `build` or `image` from an anchor are seen like any other.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Parse` if the YAML is malformed or a modelled
    /// key has the wrong shape.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut value: Value = serde_yaml::from_str(contents).map_err(ManifestError::Parse)?;
        value.apply_merge().map_err(ManifestError::Parse)?;
        let manifest: Self = serde_yaml::from_value(value).map_err(ManifestError::Parse)?;
        debug!(
            services = manifest.services.as_ref().map_or(0, BTreeMap::len),
            secrets = manifest.secrets.as_ref().map_or(0, BTreeMap::len),
            "manifest parsed"
        );
        Ok(manifest)
    }

    /// Read and parse a compose file.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Read` if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "reading manifest");
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Serialize back to YAML.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Serialize` if a passthrough value cannot be written.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self).map_err(ManifestError::Serialize)?)
    }

    /// Names of the declared top-level secrets.
    pub fn secret_names(&self) -> Vec<&str> {
        self.secrets
            .iter()
            .flat_map(|s| s.keys())
            .map(String::as_str)
            .collect()
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.as_ref()?.get(name)
    }
}
