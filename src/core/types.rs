//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

use std::collections::BTreeMap;

/// A logical secret key, the variable name with the secret prefix stripped.
pub type SecretKey = String;

/// A content-addressed secret name in the remote store
/// (e.g. `demo_DB_PASSWORD_6ca13d52`).
pub type PhysicalName = String;

/// Remote object id assigned by the cluster.
pub type ObjectId = String;

/// A service name as written in the manifest.
pub type ServiceName = String;

/// A fully tagged image reference (e.g. `registry.example/web:abc1234`).
pub type ImageRef = String;

/// Logical key to physical name, scoped to one run.
pub type SecretMapping = BTreeMap<SecretKey, PhysicalName>;

/// Service name to the image reference that replaces its build section.
pub type ImageMapping = BTreeMap<ServiceName, ImageRef>;

/// Free-form variables injected into the deploy invocation.
pub type Variables = BTreeMap<String, String>;
