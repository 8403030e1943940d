//! Deploy driver.
//!
//! Runs one deployment end to end:
//!
//! 1. Read the manifest and collect build specs
//! 2. Log in to the registry when credentials are present
//! 3. Build and push images, then point services at them
//! 4. Version secrets and rewrite declarations to external references
//! 5. Hand the generated manifest to the orchestrator
//! 6. Prune unused secrets when enabled
//!
//! In dry-run mode steps 2, 5 and 6 are skipped, builds are not run and no
//! secret is created; the rewritten manifest is still produced.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::core::build;
use crate::core::cancel::Cancel;
use crate::core::config::Resolved;
use crate::core::constants::{
    GENERATED_MANIFEST_PREFIX, GENERATED_MANIFEST_SUFFIX, SECRET_ENV_PREFIX,
};
use crate::core::domain::{EnsureResult, PruneReport};
use crate::core::manifest::{self, Manifest};
use crate::core::prune::prune;
use crate::core::secrets::{self, Scope, Versioner};
use crate::core::swarm::{ImageBuilder, Orchestrator, SecretStore};
use crate::core::types::ImageMapping;
use crate::error::{DeployError, Result};

/// Per-run switches, already merged from flags and config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployOptions {
    pub build: bool,
    pub with_secrets: bool,
    pub prune: bool,
    pub dry_run: bool,
    /// Overrides the git or timestamp tag
    pub tag: Option<String>,
}

/// What a deploy did.
#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    pub stack: String,
    pub dry_run: bool,
    pub logged_in: bool,
    /// Tag applied to built images, when building
    pub tag: Option<String>,
    pub images: ImageMapping,
    pub secrets: Option<EnsureResult>,
    /// Declared secrets with no value in the environment
    pub unmatched_secrets: Vec<String>,
    /// The manifest handed to the orchestrator
    pub manifest: String,
    pub prune: Option<PruneReport>,
    /// Post-deploy prune failure, reported but not fatal
    pub prune_error: Option<String>,
}

/// Remote collaborators used by a deploy.
pub struct Deployer<'a> {
    store: &'a dyn SecretStore,
    orchestrator: &'a dyn Orchestrator,
    builder: &'a dyn ImageBuilder,
}

impl<'a> Deployer<'a> {
    pub fn new(
        store: &'a dyn SecretStore,
        orchestrator: &'a dyn Orchestrator,
        builder: &'a dyn ImageBuilder,
    ) -> Self {
        Self {
            store,
            orchestrator,
            builder,
        }
    }

    /// Deploy the configured stack.
    ///
    /// `vars` is the explicit variable map secrets and registry credentials
    /// are read from; the deploy never looks at the process environment.
    ///
    /// # Errors
    ///
    /// Fails on the first config, manifest, build, secret or deploy error,
    /// and on cancellation. A failed post-deploy prune only sets
    /// [`DeployReport::prune_error`].
    pub fn run(
        &self,
        config: &Resolved,
        vars: &BTreeMap<String, String>,
        opts: &DeployOptions,
        cancel: &Cancel,
    ) -> Result<DeployReport> {
        let stack = config.require_stack()?;
        let manifest_path = config.manifest_path();
        let manifest_dir = manifest_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(config.base_dir.as_path())
            .to_path_buf();

        let mut report = DeployReport {
            stack: stack.to_string(),
            dry_run: opts.dry_run,
            ..Default::default()
        };

        let mut doc = Manifest::load(&manifest_path)?;
        let specs = manifest::extract_build_specs(&doc)?;

        if !opts.dry_run {
            report.logged_in = build::login(self.builder, vars, &specs, cancel)?;
        }

        if opts.build {
            if specs.is_empty() {
                warn!("build requested but no service has a build section");
            }
            let tag = build::image_tag(&manifest_dir, opts.tag.as_deref());
            report.images = if opts.dry_run {
                specs
                    .iter()
                    .map(|s| (s.service.clone(), s.tagged(&tag)))
                    .collect()
            } else {
                build::build_all(self.builder, &specs, &tag, &manifest_dir, cancel)?
            };
            doc = manifest::replace_images(&doc, &report.images);
            report.tag = Some(tag);
        }

        if opts.with_secrets {
            let logical = secrets::read(vars, SECRET_ENV_PREFIX);
            if logical.is_empty() {
                warn!(prefix = SECRET_ENV_PREFIX, "no secrets found in environment");
            }

            let scope = Scope::new(stack, config.secret_prefix());
            let ensured = Versioner::new(self.store, scope)
                .dry_run(opts.dry_run)
                .ensure(&logical, cancel)?;

            report.unmatched_secrets = manifest::unmatched_secrets(&doc, &ensured.mapping)
                .into_iter()
                .map(str::to_string)
                .collect();
            doc = manifest::rewrite_secrets(&doc, &ensured.mapping);
            report.secrets = Some(ensured);
        }

        report.manifest = doc.to_yaml()?;

        if opts.dry_run {
            info!(stack, "dry-run: skipping deploy");
            return Ok(report);
        }

        self.deploy(&report.manifest, &manifest_dir, stack, config, cancel)?;

        if opts.prune {
            match prune(self.store, self.orchestrator, stack, false, cancel) {
                Ok(pruned) => report.prune = Some(pruned),
                Err(e) if e.is_cancelled() => return Err(e),
                Err(e) => {
                    warn!(error = %e, "post-deploy prune failed");
                    report.prune_error = Some(e.to_string());
                }
            }
        }

        Ok(report)
    }

    /// Write the generated manifest next to the original and deploy it.
    ///
    /// The file is removed when this returns, whatever the outcome.
    fn deploy(
        &self,
        rendered: &str,
        dir: &Path,
        stack: &str,
        config: &Resolved,
        cancel: &Cancel,
    ) -> Result<()> {
        let write_err = |source| DeployError::Write {
            dir: dir.to_path_buf(),
            source,
        };

        let mut generated = tempfile::Builder::new()
            .prefix(GENERATED_MANIFEST_PREFIX)
            .suffix(GENERATED_MANIFEST_SUFFIX)
            .tempfile_in(dir)
            .map_err(write_err)?;
        generated
            .write_all(rendered.as_bytes())
            .and_then(|()| generated.flush())
            .map_err(write_err)?;
        debug!(path = %generated.path().display(), "wrote generated manifest");

        for key in config.variables.keys() {
            debug!(variable = %key, "exporting variable to deploy");
        }

        info!(stack, "deploying stack");
        self.orchestrator
            .deploy(generated.path(), stack, &config.variables, cancel)
            .map_err(|e| {
                e.context(|reason| {
                    DeployError::Rejected {
                        stack: stack.to_string(),
                        reason,
                    }
                    .into()
                })
            })
    }
}
