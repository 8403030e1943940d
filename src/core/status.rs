//! Stack status.

use std::collections::BTreeMap;

use crate::core::cancel::Cancel;
use crate::core::swarm::Orchestrator;
use crate::error::Result;

/// One service row of `rollwave status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    /// Name without the stack prefix
    pub name: String,
    pub running: usize,
    /// `None` for global services
    pub desired: Option<u64>,
    pub image: String,
    pub ports: String,
}

impl ServiceStatus {
    /// `running/desired`, or `running (global)`.
    pub fn replicas(&self) -> String {
        match self.desired {
            Some(desired) => format!("{}/{}", self.running, desired),
            None => format!("{} (global)", self.running),
        }
    }

    /// Whether every desired replica is running.
    pub fn healthy(&self) -> bool {
        match self.desired {
            Some(desired) => self.running as u64 >= desired,
            None => self.running > 0,
        }
    }
}

/// Services of `stack` with their running task counts, sorted by name.
///
/// # Errors
///
/// Returns an error if services or tasks cannot be listed.
pub fn status(
    orchestrator: &dyn Orchestrator,
    stack: &str,
    cancel: &Cancel,
) -> Result<Vec<ServiceStatus>> {
    let services = orchestrator.list_services(stack, cancel)?;
    let tasks = orchestrator.list_running_tasks(stack, cancel)?;

    let mut running: BTreeMap<&str, usize> = BTreeMap::new();
    for task in tasks.iter().filter(|t| t.running) {
        *running.entry(task.service.as_str()).or_default() += 1;
    }

    let mut rows: Vec<ServiceStatus> = services
        .iter()
        .map(|svc| ServiceStatus {
            name: svc.short_name(stack).to_string(),
            running: running.get(svc.name.as_str()).copied().unwrap_or(0),
            desired: if svc.is_global() { None } else { svc.desired },
            image: svc.display_image().to_string(),
            ports: svc.ports.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(rows)
}
