//! Secret source reading and content-addressed naming.
//!
//! Logical secrets come from an explicit variable map. Each one is given a
//! physical name of the form `stack[_prefix]_key_hash8`, where `hash8` is the
//! first eight hex characters of the SHA-256 of the value. Equal inputs
//! always give equal names; a changed value gives a new name, so remote
//! objects are never mutated.

mod versioner;

pub use versioner::Versioner;

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::core::constants::{HASH_LEN, NAME_SEPARATOR};
use crate::core::domain::LogicalSecret;
use crate::core::types::PhysicalName;

/// Read logical secrets from a variable map.
///
/// Every variable starting with `prefix` becomes a secret keyed by the rest
/// of its name. Variables with nothing after the prefix are skipped. The
/// result is sorted by key.
pub fn read<I, K, V>(vars: I, prefix: &str) -> Vec<LogicalSecret>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut secrets: Vec<LogicalSecret> = vars
        .into_iter()
        .filter_map(|(name, value)| {
            let key = name.as_ref().strip_prefix(prefix)?;
            if key.is_empty() {
                warn!(variable = name.as_ref(), "ignoring secret variable with empty key");
                return None;
            }
            Some(LogicalSecret::new(key, value.as_ref()))
        })
        .collect();
    secrets.sort_by(|a, b| a.key().cmp(b.key()));
    secrets
}

/// Hex SHA-256 of a secret value.
pub fn content_hash(value: &str) -> String {
    format!("{:x}", Sha256::digest(value.as_bytes()))
}

/// Naming scope for one stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    stack: String,
    prefix: Option<String>,
}

impl Scope {
    /// Create a scope. An empty prefix is the same as none.
    pub fn new(stack: impl Into<String>, prefix: Option<&str>) -> Self {
        Self {
            stack: stack.into(),
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
        }
    }

    /// Physical name for a secret: `stack[_prefix]_key_hash8`.
    pub fn physical_name(&self, key: &str, value: &str) -> PhysicalName {
        let hash = content_hash(value);
        let mut parts: Vec<&str> = vec![self.stack.as_str()];
        if let Some(prefix) = &self.prefix {
            parts.push(prefix);
        }
        parts.push(key);
        parts.push(&hash[..HASH_LEN]);
        parts.join(NAME_SEPARATOR)
    }

    /// Name prefix owned by the stack, `stack_`. Pruning only looks here.
    pub fn owned_prefix(&self) -> String {
        owned_prefix(&self.stack)
    }
}

/// Name prefix owned by a stack, `stack_`.
pub fn owned_prefix(stack: &str) -> String {
    format!("{}{}", stack, NAME_SEPARATOR)
}
