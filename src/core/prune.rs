//! Unused secret pruning.
//!
//! Deletes the stack's secrets that no current service references. The
//! candidate set is `scoped - in_use`, where `scoped` is every secret named
//! `stack_*` and `in_use` is the union of the service secret references.
//! A failed delete is recorded and the run moves on; only listing failures
//! and cancellation abort.
//!
//! Listing and deleting are not atomic. A deploy that starts between the
//! two can reference a secret this run is about to delete; the store then
//! refuses the delete and it shows up as a failure.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::core::cancel::Cancel;
use crate::core::domain::PruneReport;
use crate::core::secrets::owned_prefix;
use crate::core::swarm::{Orchestrator, SecretStore};
use crate::core::types::ObjectId;
use crate::error::{PruneError, Result};

/// Remove unused `stack_*` secrets.
///
/// With `dry_run` the candidates are reported but nothing is deleted.
///
/// # Errors
///
/// Returns `PruneError` if secrets or services cannot be listed or a
/// service cannot be inspected, and `Error::Cancelled` if the run is
/// cancelled. Individual delete failures are in the report.
pub fn prune(
    store: &dyn SecretStore,
    orchestrator: &dyn Orchestrator,
    stack: &str,
    dry_run: bool,
    cancel: &Cancel,
) -> Result<PruneReport> {
    let prefix = owned_prefix(stack);

    let mut scoped = store.list(&prefix, cancel).map_err(|e| {
        e.context(|reason| {
            PruneError::ListSecrets {
                stack: stack.to_string(),
                reason,
            }
            .into()
        })
    })?;
    // the store's filter may be looser than a prefix match
    scoped.retain(|s| s.name.starts_with(&prefix));
    scoped.sort();

    let in_use = secrets_in_use(orchestrator, stack, cancel)?;

    let (used, unused): (Vec<_>, Vec<_>) =
        scoped.iter().cloned().partition(|s| in_use.contains(&s.id));

    debug!(
        stack,
        scoped = scoped.len(),
        in_use = used.len(),
        unused = unused.len(),
        "prune candidates"
    );

    let mut report = PruneReport {
        stack: stack.to_string(),
        scoped: scoped.len(),
        in_use: used.len(),
        unused,
        dry_run,
        ..Default::default()
    };

    if dry_run {
        return Ok(report);
    }

    for secret in report.unused.clone() {
        cancel.check()?;
        match store.delete(&secret.id, cancel) {
            Ok(()) => {
                info!(name = %secret.name, "deleted unused secret");
                report.deleted.push(secret);
            }
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                warn!(name = %secret.name, error = %e, "failed to delete secret");
                report.failed.push((secret, e.to_string()));
            }
        }
    }

    Ok(report)
}

/// Union of secret ids referenced by the stack's services.
fn secrets_in_use(
    orchestrator: &dyn Orchestrator,
    stack: &str,
    cancel: &Cancel,
) -> Result<BTreeSet<ObjectId>> {
    let services = orchestrator.list_services(stack, cancel).map_err(|e| {
        e.context(|reason| {
            PruneError::ListServices {
                stack: stack.to_string(),
                reason,
            }
            .into()
        })
    })?;

    let mut in_use = BTreeSet::new();
    for service in &services {
        let refs = orchestrator
            .service_secret_refs(&service.id, cancel)
            .map_err(|e| {
                e.context(|reason| {
                    PruneError::InspectService {
                        service: service.name.clone(),
                        reason,
                    }
                    .into()
                })
            })?;
        in_use.extend(refs);
    }
    Ok(in_use)
}
