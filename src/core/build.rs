//! Image build runner.
//!
//! Builds each declared service, tags it with the run tag and `latest`,
//! pushes both, and reports the reference the manifest should deploy.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::core::cancel::Cancel;
use crate::core::constants::{REGISTRY_PASSWORD_VAR, REGISTRY_USER_VAR};
use crate::core::domain::BuildSpec;
use crate::core::swarm::ImageBuilder;
use crate::core::types::{ImageMapping, ImageRef};
use crate::error::{BuildError, Result};

/// Tag applied to every image of a run.
///
/// An explicit tag wins. Otherwise the short git hash of `dir`, falling
/// back to `v<unix-seconds>` outside a repository.
pub fn image_tag(dir: &Path, explicit: Option<&str>) -> String {
    if let Some(tag) = explicit.filter(|t| !t.trim().is_empty()) {
        return tag.to_string();
    }

    match git_short_hash(dir) {
        Some(hash) => hash,
        None => {
            let tag = format!("v{}", chrono::Utc::now().timestamp());
            debug!(tag = %tag, "git unavailable, using timestamp tag");
            tag
        }
    }
}

fn git_short_hash(dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!hash.is_empty()).then_some(hash)
}

/// Registry host of an image, or `None` for the default registry.
///
/// The first path segment is a host when it contains `.` or `:` or is
/// `localhost`.
pub fn registry_host(image: &str) -> Option<&str> {
    let (first, _) = image.split_once('/')?;
    if first.contains('.') || first.contains(':') || first == "localhost" {
        Some(first)
    } else {
        None
    }
}

/// Log in to the registry of the first built image.
///
/// Does nothing unless both registry credential variables are set and
/// non-empty. Returns whether a login happened.
///
/// # Errors
///
/// Returns `BuildError::Login` if the registry rejects the credentials.
pub fn login(
    builder: &dyn ImageBuilder,
    vars: &BTreeMap<String, String>,
    specs: &[BuildSpec],
    cancel: &Cancel,
) -> Result<bool> {
    let user = vars.get(REGISTRY_USER_VAR).filter(|v| !v.is_empty());
    let password = vars.get(REGISTRY_PASSWORD_VAR).filter(|v| !v.is_empty());
    let (Some(user), Some(password), Some(first)) = (user, password, specs.first()) else {
        return Ok(false);
    };

    let registry = registry_host(&first.image);
    let target = registry.unwrap_or("default registry").to_string();
    info!(registry = %target, user = %user, "logging in to registry");

    builder
        .login(registry, user, password, cancel)
        .map_err(|e| {
            e.context(|reason| {
                BuildError::Login {
                    registry: target.clone(),
                    reason,
                }
                .into()
            })
        })?;
    Ok(true)
}

/// Build one service, push `image:tag` and `image:latest`.
///
/// # Errors
///
/// Returns `BuildError::Failed` naming the service if the build or either
/// push fails.
pub fn build_and_push(
    builder: &dyn ImageBuilder,
    spec: &BuildSpec,
    tag: &str,
    manifest_dir: &Path,
    cancel: &Cancel,
) -> Result<ImageRef> {
    let versioned = spec.tagged(tag);
    let latest = spec.tagged("latest");
    let context = spec.context_path(manifest_dir);
    let dockerfile = spec.dockerfile_path(manifest_dir);

    let fail = |e: crate::error::Error| {
        e.context(|reason| {
            BuildError::Failed {
                service: spec.service.clone(),
                reason,
            }
            .into()
        })
    };

    info!(service = %spec.service, image = %versioned, "building image");
    builder
        .build(&context, &dockerfile, &[versioned.clone(), latest.clone()], cancel)
        .map_err(fail)?;

    for reference in [&versioned, &latest] {
        info!(reference = %reference, "pushing image");
        builder.push(reference, cancel).map_err(fail)?;
    }

    Ok(versioned)
}

/// Build and push every spec in order, stopping at the first failure.
///
/// # Errors
///
/// Returns the first `BuildError` or `Error::Cancelled`.
pub fn build_all(
    builder: &dyn ImageBuilder,
    specs: &[BuildSpec],
    tag: &str,
    manifest_dir: &Path,
    cancel: &Cancel,
) -> Result<ImageMapping> {
    let mut images = ImageMapping::new();
    for spec in specs {
        cancel.check()?;
        let reference = build_and_push(builder, spec, tag, manifest_dir, cancel)?;
        images.insert(spec.service.clone(), reference);
    }
    Ok(images)
}
