use crate::core::domain::RemoteSecret;

/// Outcome of a prune run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PruneReport {
    pub stack: String,
    /// Secrets matching `stack_*`
    pub scoped: usize,
    /// Scoped secrets still referenced by a service
    pub in_use: usize,
    /// Scoped secrets no service references
    pub unused: Vec<RemoteSecret>,
    /// Successfully deleted secrets
    pub deleted: Vec<RemoteSecret>,
    /// Secrets whose deletion failed, with the reason
    pub failed: Vec<(RemoteSecret, String)>,
    pub dry_run: bool,
}

impl PruneReport {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }
}
