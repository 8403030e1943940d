//! In-memory cluster backend.
//!
//! Behaves like a single-node swarm for the parts rollwave uses: secrets are
//! immutable named objects, a deploy replaces the stack's services with the
//! ones in the manifest, and services hold references to secret ids.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde_yaml::Value;
use tracing::trace;

use super::{ImageBuilder, Orchestrator, SecretStore};
use crate::core::cancel::Cancel;
use crate::core::domain::{RemoteSecret, ServiceSummary, Task};
use crate::core::types::{ObjectId, Variables};
use crate::error::{DockerError, Error, Result};

/// A mutating call observed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { name: String },
    Delete { id: ObjectId },
    Deploy { stack: String, manifest: String, variables: Variables },
    Login { registry: Option<String>, user: String },
    Build { context: String, dockerfile: String, tags: Vec<String> },
    Push { reference: String },
}

#[derive(Debug, Clone)]
struct StoredSecret {
    id: ObjectId,
    value: String,
}

#[derive(Debug, Clone)]
struct Service {
    summary: ServiceSummary,
    secret_ids: Vec<ObjectId>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    secrets: BTreeMap<String, StoredSecret>,
    stacks: BTreeMap<String, Vec<Service>>,
    calls: Vec<Call>,
    fail_create: BTreeSet<String>,
    fail_delete: BTreeSet<ObjectId>,
    fail_build: BTreeSet<String>,
    fail_deploy: Option<String>,
    fail_list_secrets: bool,
    fail_list_services: bool,
}

impl State {
    fn next_id(&mut self, kind: &str) -> ObjectId {
        self.next_id += 1;
        format!("{}{:04}", kind, self.next_id)
    }
}

/// In-process cluster.
#[derive(Debug, Default)]
pub struct Memory {
    state: RefCell<State>,
}

fn rejected(command: &str, reason: impl Into<String>) -> Error {
    DockerError::Failed {
        command: command.to_string(),
        status: "exit status: 1".to_string(),
        stderr: reason.into(),
    }
    .into()
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a secret directly, bypassing the call log. Returns its id.
    pub fn insert_secret(&self, name: &str, value: &str) -> ObjectId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id("sec");
        state.secrets.insert(
            name.to_string(),
            StoredSecret {
                id: id.clone(),
                value: value.to_string(),
            },
        );
        id
    }

    /// Seed a service of `stack` referencing the given secret ids. Returns its id.
    pub fn insert_service(&self, stack: &str, name: &str, secret_ids: &[&str]) -> ObjectId {
        let mut state = self.state.borrow_mut();
        let id = state.next_id("svc");
        let service = Service {
            summary: ServiceSummary {
                id: id.clone(),
                name: format!("{}_{}", stack, name),
                mode: "replicated".to_string(),
                desired: Some(1),
                image: String::new(),
                ports: String::new(),
            },
            secret_ids: secret_ids.iter().map(|s| s.to_string()).collect(),
        };
        state.stacks.entry(stack.to_string()).or_default().push(service);
        id
    }

    /// Names of all stored secrets.
    pub fn secret_names(&self) -> Vec<String> {
        self.state.borrow().secrets.keys().cloned().collect()
    }

    /// Stored payload of a secret, for assertions.
    pub fn secret_value(&self, name: &str) -> Option<String> {
        self.state
            .borrow()
            .secrets
            .get(name)
            .map(|s| s.value.clone())
    }

    /// Id of a secret by name.
    pub fn secret_id(&self, name: &str) -> Option<ObjectId> {
        self.state.borrow().secrets.get(name).map(|s| s.id.clone())
    }

    /// Every mutating call so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// Number of `create` calls so far.
    pub fn created_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }

    pub fn fail_create(&self, name: &str) {
        self.state.borrow_mut().fail_create.insert(name.to_string());
    }

    pub fn fail_delete(&self, id: &str) {
        self.state.borrow_mut().fail_delete.insert(id.to_string());
    }

    /// Fail builds whose tags include an image starting with `image`.
    pub fn fail_build(&self, image: &str) {
        self.state.borrow_mut().fail_build.insert(image.to_string());
    }

    pub fn fail_deploy(&self, reason: &str) {
        self.state.borrow_mut().fail_deploy = Some(reason.to_string());
    }

    pub fn fail_list_secrets(&self) {
        self.state.borrow_mut().fail_list_secrets = true;
    }

    pub fn fail_list_services(&self) {
        self.state.borrow_mut().fail_list_services = true;
    }

    /// Replace the stack's services with those declared in `doc`.
    fn apply(&self, stack: &str, doc: &Value) -> Result<()> {
        let declared_secrets = doc.get("secrets").and_then(Value::as_mapping);
        let mut services = Vec::new();

        if let Some(map) = doc.get("services").and_then(Value::as_mapping) {
            for (name, body) in map {
                let name = name.as_str().unwrap_or_default();
                let mut secret_ids = Vec::new();

                let refs = body.get("secrets").and_then(Value::as_sequence);
                for item in refs.into_iter().flatten() {
                    let source = item
                        .as_str()
                        .or_else(|| item.get("source").and_then(Value::as_str))
                        .unwrap_or_default();
                    let decl = declared_secrets.and_then(|m| m.get(source));
                    let external = decl
                        .and_then(|d| d.get("external"))
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    let remote_name = decl
                        .and_then(|d| d.get("name"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("{}_{}", stack, source));

                    let id = match self.secret_id(&remote_name) {
                        Some(id) => id,
                        None if external => {
                            return Err(rejected(
                                "docker stack deploy",
                                format!("secret not found: {}", remote_name),
                            ))
                        }
                        None => self.insert_secret(&remote_name, ""),
                    };
                    secret_ids.push(id);
                }

                let image = body
                    .get("image")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let desired = body
                    .get("deploy")
                    .and_then(|d| d.get("replicas"))
                    .and_then(Value::as_u64)
                    .unwrap_or(1);

                let id = self.state.borrow_mut().next_id("svc");
                services.push(Service {
                    summary: ServiceSummary {
                        id,
                        name: format!("{}_{}", stack, name),
                        mode: "replicated".to_string(),
                        desired: Some(desired),
                        image,
                        ports: String::new(),
                    },
                    secret_ids,
                });
            }
        }

        self.state
            .borrow_mut()
            .stacks
            .insert(stack.to_string(), services);
        Ok(())
    }
}

impl SecretStore for Memory {
    fn list(&self, prefix: &str, cancel: &Cancel) -> Result<Vec<RemoteSecret>> {
        cancel.check()?;
        let state = self.state.borrow();
        if state.fail_list_secrets {
            return Err(rejected("docker secret ls", "cannot connect to the daemon"));
        }
        Ok(state
            .secrets
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, s)| RemoteSecret::new(s.id.clone(), name.clone()))
            .collect())
    }

    fn exists(&self, name: &str, cancel: &Cancel) -> Result<bool> {
        cancel.check()?;
        Ok(self.state.borrow().secrets.contains_key(name))
    }

    fn create(&self, name: &str, value: &str, cancel: &Cancel) -> Result<()> {
        cancel.check()?;
        trace!(name, "memory: create secret");
        let mut state = self.state.borrow_mut();
        if state.fail_create.contains(name) {
            return Err(rejected("docker secret create", "permission denied"));
        }
        if state.secrets.contains_key(name) {
            return Err(rejected(
                "docker secret create",
                format!("secret {} already exists", name),
            ));
        }
        let id = state.next_id("sec");
        state.secrets.insert(
            name.to_string(),
            StoredSecret {
                id,
                value: value.to_string(),
            },
        );
        state.calls.push(Call::Create {
            name: name.to_string(),
        });
        Ok(())
    }

    fn delete(&self, id: &str, cancel: &Cancel) -> Result<()> {
        cancel.check()?;
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Delete { id: id.to_string() });
        if state.fail_delete.contains(id) {
            return Err(rejected("docker secret rm", "secret is in use"));
        }
        let name = state
            .secrets
            .iter()
            .find(|(_, s)| s.id == id)
            .map(|(name, _)| name.clone())
            .ok_or_else(|| rejected("docker secret rm", format!("no such secret: {}", id)))?;
        state.secrets.remove(&name);
        Ok(())
    }
}

impl Orchestrator for Memory {
    fn list_services(&self, stack: &str, cancel: &Cancel) -> Result<Vec<ServiceSummary>> {
        cancel.check()?;
        let state = self.state.borrow();
        if state.fail_list_services {
            return Err(rejected("docker stack services", "cannot connect to the daemon"));
        }
        Ok(state
            .stacks
            .get(stack)
            .map(|services| services.iter().map(|s| s.summary.clone()).collect())
            .unwrap_or_default())
    }

    fn list_running_tasks(&self, stack: &str, cancel: &Cancel) -> Result<Vec<Task>> {
        cancel.check()?;
        let state = self.state.borrow();
        let mut tasks = Vec::new();
        for service in state.stacks.get(stack).into_iter().flatten() {
            for slot in 1..=service.summary.desired.unwrap_or(1) {
                tasks.push(Task {
                    id: format!("{}.{}", service.summary.id, slot),
                    service: service.summary.name.clone(),
                    running: true,
                });
            }
        }
        Ok(tasks)
    }

    fn service_secret_refs(&self, service_id: &str, cancel: &Cancel) -> Result<Vec<ObjectId>> {
        cancel.check()?;
        let state = self.state.borrow();
        state
            .stacks
            .values()
            .flatten()
            .find(|s| s.summary.id == service_id)
            .map(|s| s.secret_ids.clone())
            .ok_or_else(|| rejected("docker service inspect", format!("no such service: {}", service_id)))
    }

    fn deploy(
        &self,
        manifest: &Path,
        stack: &str,
        variables: &Variables,
        cancel: &Cancel,
    ) -> Result<()> {
        cancel.check()?;
        let contents = std::fs::read_to_string(manifest)?;
        {
            let mut state = self.state.borrow_mut();
            state.calls.push(Call::Deploy {
                stack: stack.to_string(),
                manifest: contents.clone(),
                variables: variables.clone(),
            });
            if let Some(reason) = state.fail_deploy.clone() {
                return Err(rejected("docker stack deploy", reason));
            }
        }
        let doc: Value = serde_yaml::from_str(&contents)
            .map_err(|e| rejected("docker stack deploy", e.to_string()))?;
        self.apply(stack, &doc)
    }
}

impl ImageBuilder for Memory {
    fn login(
        &self,
        registry: Option<&str>,
        user: &str,
        _password: &str,
        cancel: &Cancel,
    ) -> Result<()> {
        cancel.check()?;
        self.state.borrow_mut().calls.push(Call::Login {
            registry: registry.map(str::to_string),
            user: user.to_string(),
        });
        Ok(())
    }

    fn build(
        &self,
        context: &Path,
        dockerfile: &Path,
        tags: &[String],
        cancel: &Cancel,
    ) -> Result<()> {
        cancel.check()?;
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Build {
            context: context.display().to_string(),
            dockerfile: dockerfile.display().to_string(),
            tags: tags.to_vec(),
        });
        let failing = tags
            .iter()
            .any(|t| state.fail_build.iter().any(|image| t.starts_with(image.as_str())));
        if failing {
            return Err(rejected("docker build", "failed to solve: dockerfile parse error"));
        }
        Ok(())
    }

    fn push(&self, reference: &str, cancel: &Cancel) -> Result<()> {
        cancel.check()?;
        self.state.borrow_mut().calls.push(Call::Push {
            reference: reference.to_string(),
        });
        Ok(())
    }
}
