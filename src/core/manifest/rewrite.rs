//! Pure manifest transforms.
//!
//! Each transform takes a document and returns a new one; the input is
//! never touched. Keys outside the modelled fields pass through as-is.

use serde_yaml::Value;
use tracing::{debug, warn};

use super::{Build, Manifest, SecretDecl};
use crate::core::constants::{DEFAULT_BUILD_CONTEXT, DEFAULT_DOCKERFILE};
use crate::core::domain::BuildSpec;
use crate::core::types::{ImageMapping, SecretMapping};
use crate::error::{ManifestError, Result};

/// Collect a build spec for every service with a `build` section.
///
/// A string `build` is the context. An options table supplies `context` and
/// `dockerfile`, defaulting to `.` and `Dockerfile`. Specs are sorted by
/// service name.
///
/// # Errors
///
/// Returns `ManifestError::MissingImage` if a service builds but has no image
/// to push to. No partial result is returned.
pub fn extract_build_specs(doc: &Manifest) -> Result<Vec<BuildSpec>> {
    let Some(services) = &doc.services else {
        return Ok(Vec::new());
    };

    let mut specs = Vec::new();
    for (name, service) in services {
        let Some(build) = &service.build else {
            continue;
        };

        let image = service
            .image
            .as_deref()
            .filter(|i| !i.trim().is_empty())
            .ok_or_else(|| ManifestError::MissingImage {
                service: name.clone(),
            })?;

        let (context, dockerfile) = match build {
            Build::Context(context) => (context.as_str(), None),
            Build::Options(opts) => (
                opts.context.as_deref().unwrap_or(DEFAULT_BUILD_CONTEXT),
                opts.dockerfile.as_deref(),
            ),
        };

        specs.push(BuildSpec {
            service: name.clone(),
            image: image.to_string(),
            context: non_empty(context, DEFAULT_BUILD_CONTEXT),
            dockerfile: non_empty(dockerfile.unwrap_or(DEFAULT_DOCKERFILE), DEFAULT_DOCKERFILE),
        });
    }

    debug!(count = specs.len(), "extracted build specs");
    Ok(specs)
}

fn non_empty(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// Point services at pushed images and drop their `build` sections.
///
/// Services not named in `images` are left alone, as are names in `images`
/// that the manifest does not define.
pub fn replace_images(doc: &Manifest, images: &ImageMapping) -> Manifest {
    let mut out = doc.clone();
    let Some(services) = out.services.as_mut() else {
        return out;
    };

    for (name, image) in images {
        match services.get_mut(name) {
            Some(service) => {
                service.image = Some(image.clone());
                service.build = None;
            }
            None => debug!(service = %name, "image for unknown service ignored"),
        }
    }

    out
}

/// Turn declared secrets into references to existing remote objects.
///
/// Every top-level secret whose key is in `mapping` becomes
/// `{ name: <physical>, external: true }`. Local sources (`file`,
/// `environment`) are removed. Other declared secrets are left unchanged.
pub fn rewrite_secrets(doc: &Manifest, mapping: &SecretMapping) -> Manifest {
    let mut out = doc.clone();
    let Some(secrets) = out.secrets.as_mut() else {
        return out;
    };

    for (key, decl) in secrets.iter_mut() {
        let Some(physical) = mapping.get(key) else {
            continue;
        };

        let decl = decl.get_or_insert_with(SecretDecl::default);
        decl.name = Some(physical.clone());
        decl.external = Some(Value::Bool(true));
        decl.file = None;
        decl.environment = None;
    }

    out
}

/// Declared secrets with no entry in `mapping`, logged as warnings.
pub fn unmatched_secrets<'a>(doc: &'a Manifest, mapping: &SecretMapping) -> Vec<&'a str> {
    let unmatched: Vec<&str> = doc
        .secret_names()
        .into_iter()
        .filter(|name| !mapping.contains_key(*name))
        .collect();

    for name in &unmatched {
        warn!(
            secret = %name,
            "secret declared in manifest but not provided in environment"
        );
    }

    unmatched
}
