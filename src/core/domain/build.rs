//! Build declaration extracted from a manifest service.

use std::path::{Path, PathBuf};

use crate::core::types::ServiceName;

/// What to build and where to publish it, for one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    pub service: ServiceName,
    /// Image name without tag (e.g. `registry.example/web`)
    pub image: String,
    /// Build context, relative to the manifest's directory
    pub context: String,
    /// Dockerfile, relative to the context
    pub dockerfile: String,
}

impl BuildSpec {
    /// Build context resolved against the manifest directory.
    pub fn context_path(&self, manifest_dir: &Path) -> PathBuf {
        manifest_dir.join(&self.context)
    }

    /// Dockerfile resolved against the context, unless absolute.
    pub fn dockerfile_path(&self, manifest_dir: &Path) -> PathBuf {
        self.context_path(manifest_dir).join(&self.dockerfile)
    }

    /// `image:tag`
    pub fn tagged(&self, tag: &str) -> String {
        format!("{}:{}", self.image, tag)
    }
}
