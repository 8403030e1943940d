//! Remote cluster collaborators.
//!
//! The engine talks to the outside world only through these traits:
//! a secret store, an orchestrator and an image builder.
//!
//! ## Backends
//!
//! - **Docker**: shells out to the `docker` CLI against the active context
//!   or `DOCKER_HOST`.
//! - **Memory**: in-process cluster used by tests and benchmarks. It records
//!   every mutating call and can be told to fail specific operations.
//!
//! ## Adding a New Backend
//!
//! 1. Implement the traits it can serve
//! 2. Add the implementation in a new file (e.g., `api.rs`)
//! 3. Re-export from this module

use std::path::Path;

use crate::core::cancel::Cancel;
use crate::core::domain::{RemoteSecret, ServiceSummary, Task};
use crate::core::types::{ObjectId, Variables};
use crate::error::Result;

mod docker;
mod memory;

pub use docker::Docker;
pub use memory::{Call, Memory};

/// Remote secret store.
///
/// Objects are immutable once created. Values go in but never come back out.
pub trait SecretStore {
    /// List secrets whose name starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    fn list(&self, prefix: &str, cancel: &Cancel) -> Result<Vec<RemoteSecret>>;

    /// Whether a secret with exactly this name exists.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store could not be asked at all.
    fn exists(&self, name: &str, cancel: &Cancel) -> Result<bool>;

    /// Create a secret with `value` as payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the object.
    fn create(&self, name: &str, value: &str, cancel: &Cancel) -> Result<()>;

    /// Delete a secret by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is in use, missing or the store fails.
    fn delete(&self, id: &str, cancel: &Cancel) -> Result<()>;
}

/// Stack-level orchestrator operations.
pub trait Orchestrator {
    /// Services belonging to the stack.
    ///
    /// # Errors
    ///
    /// Returns an error if the services cannot be listed.
    fn list_services(&self, stack: &str, cancel: &Cancel) -> Result<Vec<ServiceSummary>>;

    /// Tasks of the stack whose desired state is running.
    ///
    /// # Errors
    ///
    /// Returns an error if the tasks cannot be listed.
    fn list_running_tasks(&self, stack: &str, cancel: &Cancel) -> Result<Vec<Task>>;

    /// Secret ids referenced by a service spec.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be inspected.
    fn service_secret_refs(&self, service_id: &str, cancel: &Cancel) -> Result<Vec<ObjectId>>;

    /// Deploy `manifest` as `stack`, with `variables` in the invocation environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the orchestrator rejects the manifest.
    fn deploy(
        &self,
        manifest: &Path,
        stack: &str,
        variables: &Variables,
        cancel: &Cancel,
    ) -> Result<()>;
}

/// Image build and publish.
pub trait ImageBuilder {
    /// Log in to `registry`, or the default registry when `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry rejects the credentials.
    fn login(&self, registry: Option<&str>, user: &str, password: &str, cancel: &Cancel)
        -> Result<()>;

    /// Build `dockerfile` in `context` and apply every tag in `tags`.
    ///
    /// # Errors
    ///
    /// Returns an error if the build fails.
    fn build(&self, context: &Path, dockerfile: &Path, tags: &[String], cancel: &Cancel)
        -> Result<()>;

    /// Push a tagged reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the push fails.
    fn push(&self, reference: &str, cancel: &Cancel) -> Result<()>;
}
