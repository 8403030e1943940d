//! Secret versioning against a remote store.

use tracing::{debug, info};

use super::Scope;
use crate::core::cancel::Cancel;
use crate::core::domain::{EnsureResult, LogicalSecret};
use crate::core::swarm::SecretStore;
use crate::error::{Result, SecretError};

/// Ensures a remote object exists for every logical secret.
///
/// Objects are looked up by physical name only and created when absent.
/// Existing objects are never read, changed or deleted, which makes repeated
/// runs with unchanged values free of side effects.
pub struct Versioner<'a> {
    store: &'a dyn SecretStore,
    scope: Scope,
    dry_run: bool,
}

impl<'a> Versioner<'a> {
    pub fn new(store: &'a dyn SecretStore, scope: Scope) -> Self {
        Self {
            store,
            scope,
            dry_run: false,
        }
    }

    /// In dry-run mode names are derived but the store is never called.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Derive physical names and create the missing objects.
    ///
    /// The returned mapping is identical in live and dry-run mode.
    ///
    /// # Errors
    ///
    /// Returns `SecretError::EmptyValue` before any remote call if a secret is
    /// empty, `SecretError::CreateFailed` naming the physical secret if the
    /// store rejects an object, or `Error::Cancelled`.
    pub fn ensure(&self, secrets: &[LogicalSecret], cancel: &Cancel) -> Result<EnsureResult> {
        if let Some(empty) = secrets.iter().find(|s| s.value().is_empty()) {
            return Err(SecretError::EmptyValue(empty.key().to_string()).into());
        }

        let mut result = EnsureResult::default();

        for secret in secrets {
            cancel.check()?;
            let name = self.scope.physical_name(secret.key(), secret.value());
            result
                .mapping
                .insert(secret.key().to_string(), name.clone());

            if self.dry_run {
                info!(key = secret.key(), name = %name, "dry-run: would ensure secret");
                result.planned.push(name);
                continue;
            }

            let exists = self.store.exists(&name, cancel).map_err(|e| {
                e.context(|reason| {
                    SecretError::Lookup {
                        name: name.clone(),
                        reason,
                    }
                    .into()
                })
            })?;

            if exists {
                debug!(name = %name, "secret version already present");
                result.existing.push(name);
                continue;
            }

            self.store
                .create(&name, secret.value(), cancel)
                .map_err(|e| {
                    e.context(|reason| {
                        SecretError::CreateFailed {
                            name: name.clone(),
                            reason,
                        }
                        .into()
                    })
                })?;
            info!(
                key = secret.key(),
                name = %name,
                len = secret.value().len(),
                "created secret version"
            );
            result.created.push(name);
        }

        Ok(result)
    }
}
