//! Records reported by the remote cluster.

use crate::core::types::ObjectId;

/// A secret object as listed by the remote store. Never carries a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemoteSecret {
    pub id: ObjectId,
    pub name: String,
}

impl RemoteSecret {
    pub fn new(id: impl Into<ObjectId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for RemoteSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A service of a deployed stack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceSummary {
    pub id: ObjectId,
    /// Full name, including the `stack_` prefix
    pub name: String,
    /// `replicated` or `global`
    pub mode: String,
    /// Desired replicas for replicated services
    pub desired: Option<u64>,
    pub image: String,
    pub ports: String,
}

impl ServiceSummary {
    /// Service name without the stack prefix.
    pub fn short_name<'a>(&'a self, stack: &str) -> &'a str {
        self.name
            .strip_prefix(stack)
            .and_then(|rest| rest.strip_prefix('_'))
            .unwrap_or(&self.name)
    }

    /// Image reference without a trailing `@sha256:` digest.
    pub fn display_image(&self) -> &str {
        match self.image.find("@sha256") {
            Some(idx) => &self.image[..idx],
            None => &self.image,
        }
    }

    pub fn is_global(&self) -> bool {
        self.mode == "global"
    }
}

/// A task the orchestrator wants running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: ObjectId,
    /// Full name of the owning service
    pub service: String,
    /// Whether the task is currently in the running state
    pub running: bool,
}
