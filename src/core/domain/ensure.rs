use crate::core::types::{PhysicalName, SecretMapping};

/// Result of ensuring secrets against the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnsureResult {
    /// Logical key to physical name
    pub mapping: SecretMapping,
    /// Objects created by this call
    pub created: Vec<PhysicalName>,
    /// Objects that already existed
    pub existing: Vec<PhysicalName>,
    /// Names derived in dry-run mode without touching the store
    pub planned: Vec<PhysicalName>,
}
