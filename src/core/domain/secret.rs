//! Logical secret type.
//!
//! A key/value pair read from one `ROLLWAVE_SECRET_*` variable.

use zeroize::Zeroizing;

use crate::core::types::SecretKey;

/// A secret as declared locally, before external naming.
///
/// The value is zeroed on drop and never shown by `Debug` or `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct LogicalSecret {
    key: SecretKey,
    value: Zeroizing<String>,
}

impl LogicalSecret {
    pub fn new(key: impl Into<SecretKey>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Zeroizing::new(value.into()),
        }
    }

    /// Key with the variable prefix stripped, case preserved
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw secret content
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Debug for LogicalSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogicalSecret")
            .field("key", &self.key)
            .field("value", &format_args!("<{} bytes>", self.value.len()))
            .finish()
    }
}

impl std::fmt::Display for LogicalSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}
