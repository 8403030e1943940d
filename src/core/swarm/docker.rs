//! Docker CLI backend.
//!
//! Drives a swarm through the `docker` binary, the same way an operator
//! would from a shell. Talks to whatever the active docker context or
//! `DOCKER_HOST` points at, including `ssh://` hosts.
//!
//! ## Requirements
//!
//! - `docker` CLI must be installed (or `ROLLWAVE_DOCKER` must point at it)
//! - The target engine must be a swarm manager

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, trace};

use super::{ImageBuilder, Orchestrator, SecretStore};
use crate::core::cancel::Cancel;
use crate::core::domain::{RemoteSecret, ServiceSummary, Task};
use crate::core::types::{ObjectId, Variables};
use crate::error::{DockerError, Error, Result};

/// How often a running child is checked for exit or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Docker CLI backend.
#[derive(Debug, Clone)]
pub struct Docker {
    program: PathBuf,
}

/// One docker invocation.
#[derive(Default)]
struct Invocation<'a> {
    args: Vec<String>,
    stdin: Option<&'a str>,
    env: Option<&'a Variables>,
    /// Let the child write straight to the terminal (build, push, deploy)
    stream: bool,
}

impl<'a> Invocation<'a> {
    fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    fn stdin(mut self, input: &'a str) -> Self {
        self.stdin = Some(input);
        self
    }

    fn env(mut self, vars: &'a Variables) -> Self {
        self.env = Some(vars);
        self
    }

    fn stream(mut self) -> Self {
        self.stream = true;
        self
    }

    /// `docker <sub> <verb>` for messages; never includes values.
    fn label(&self) -> String {
        let words: Vec<&str> = self
            .args
            .iter()
            .take_while(|a| !a.starts_with('-'))
            .take(2)
            .map(String::as_str)
            .collect();
        format!("docker {}", words.join(" "))
    }
}

impl Docker {
    /// Resolve the docker binary on `PATH` (or as given).
    ///
    /// # Errors
    ///
    /// Returns `DockerError::NotFound` if the program cannot be found.
    pub fn locate(program: &str) -> Result<Self> {
        let program = which::which(program).map_err(|_| DockerError::NotFound {
            program: program.to_string(),
        })?;
        debug!(program = %program.display(), "using docker CLI");
        Ok(Self { program })
    }

    /// Use `program` as-is without searching `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run an invocation to completion, killing the child if `cancel` fires.
    ///
    /// Returns captured stdout (empty when streaming).
    fn run(&self, inv: Invocation<'_>, cancel: &Cancel) -> Result<String> {
        cancel.check()?;
        let label = inv.label();
        trace!(command = %label, args = inv.args.len(), "spawning docker");

        let mut cmd = Command::new(&self.program);
        cmd.args(&inv.args);
        if let Some(vars) = inv.env {
            cmd.envs(vars);
        }
        cmd.stdin(if inv.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        if inv.stream {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        let mut child = cmd.spawn().map_err(|source| DockerError::Spawn {
            command: label.clone(),
            source,
        })?;

        if let (Some(input), Some(mut stdin)) = (inv.stdin, child.stdin.take()) {
            if let Err(source) = stdin.write_all(input.as_bytes()) {
                debug!(command = %label, "stdin write failed, killing docker");
                let _ = child.kill();
                let _ = child.wait();
                return Err(DockerError::Spawn {
                    command: label,
                    source,
                }
                .into());
            }
        }

        let stdout = child.stdout.take().map(spawn_reader);
        let stderr = child.stderr.take().map(spawn_reader);

        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if cancel.is_cancelled() {
                debug!(command = %label, "cancelled, killing docker");
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Cancelled);
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = collect(stdout);
        let stderr = collect(stderr);
        check_status(&label, status, &stderr)?;
        Ok(stdout)
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn check_status(label: &str, status: ExitStatus, stderr: &str) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    let stderr = stderr.trim();
    Err(DockerError::Failed {
        command: label.to_string(),
        status: status.to_string(),
        stderr: if stderr.is_empty() {
            "see output above".to_string()
        } else {
            stderr.to_string()
        },
    }
    .into())
}

/// Whether a failure just means the stack has nothing deployed.
fn is_empty_stack(err: &Error) -> bool {
    match err {
        Error::Docker(DockerError::Failed { stderr, .. }) => {
            stderr.to_ascii_lowercase().contains("nothing found in stack")
        }
        _ => false,
    }
}

#[derive(Debug, Deserialize)]
struct SecretLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ServiceLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Mode", default)]
    mode: String,
    #[serde(rename = "Replicas", default)]
    replicas: String,
    #[serde(rename = "Image", default)]
    image: String,
    #[serde(rename = "Ports", default)]
    ports: String,
}

#[derive(Debug, Deserialize)]
struct TaskLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "CurrentState", default)]
    current_state: String,
}

#[derive(Debug, Deserialize)]
struct SecretRef {
    #[serde(rename = "SecretID", default)]
    secret_id: String,
}

/// Parse `--format '{{json .}}'` output, one object per line.
///
/// Lines that are not JSON objects (e.g. "Nothing found in stack") are skipped.
fn parse_lines<T: for<'de> Deserialize<'de>>(output: &str) -> Vec<T> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(error = %e, "skipping unparsable docker output line");
                None
            }
        })
        .collect()
}

/// Desired count from a `Replicas` column like `2/3` or `1/1 (max 1 per node)`.
fn desired_replicas(column: &str) -> Option<u64> {
    let (_, desired) = column.split_once('/')?;
    let digits: String = desired.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Owning service of a task name: `demo_web.1` or `demo_web.<node-id>`.
fn task_service(name: &str) -> &str {
    name.rsplit_once('.').map(|(svc, _)| svc).unwrap_or(name)
}

fn parse_secret_refs(output: &str) -> Result<Vec<ObjectId>> {
    let mut ids = Vec::new();
    for line in output.lines().map(str::trim) {
        if line.is_empty() || line == "null" {
            continue;
        }
        let refs: Vec<SecretRef> =
            serde_json::from_str(line).map_err(|e| DockerError::Parse {
                command: "docker service inspect".to_string(),
                reason: format!("{}: {}", line, e),
            })?;
        ids.extend(refs.into_iter().map(|r| r.secret_id).filter(|id| !id.is_empty()));
    }
    Ok(ids)
}

impl SecretStore for Docker {
    fn list(&self, prefix: &str, cancel: &Cancel) -> Result<Vec<RemoteSecret>> {
        let out = self.run(
            Invocation::new(["secret", "ls", "--format", "{{json .}}"]),
            cancel,
        )?;
        Ok(parse_lines::<SecretLine>(&out)
            .into_iter()
            .filter(|s| s.name.starts_with(prefix))
            .map(|s| RemoteSecret::new(s.id, s.name))
            .collect())
    }

    fn exists(&self, name: &str, cancel: &Cancel) -> Result<bool> {
        match self.run(
            Invocation::new(["secret", "inspect", "--format", "{{.ID}}", name]),
            cancel,
        ) {
            Ok(_) => Ok(true),
            Err(Error::Docker(DockerError::Failed { .. })) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn create(&self, name: &str, value: &str, cancel: &Cancel) -> Result<()> {
        self.run(
            Invocation::new(["secret", "create", name, "-"]).stdin(value),
            cancel,
        )?;
        Ok(())
    }

    fn delete(&self, id: &str, cancel: &Cancel) -> Result<()> {
        self.run(Invocation::new(["secret", "rm", id]), cancel)?;
        Ok(())
    }
}

impl Orchestrator for Docker {
    fn list_services(&self, stack: &str, cancel: &Cancel) -> Result<Vec<ServiceSummary>> {
        let out = match self.run(
            Invocation::new(["stack", "services", stack, "--format", "{{json .}}"]),
            cancel,
        ) {
            Ok(out) => out,
            Err(e) if is_empty_stack(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(parse_lines::<ServiceLine>(&out)
            .into_iter()
            .map(|s| ServiceSummary {
                desired: desired_replicas(&s.replicas),
                id: s.id,
                name: s.name,
                mode: s.mode,
                image: s.image,
                ports: s.ports,
            })
            .collect())
    }

    fn list_running_tasks(&self, stack: &str, cancel: &Cancel) -> Result<Vec<Task>> {
        let out = match self.run(
            Invocation::new([
                "stack",
                "ps",
                stack,
                "--filter",
                "desired-state=running",
                "--format",
                "{{json .}}",
            ]),
            cancel,
        ) {
            Ok(out) => out,
            Err(e) if is_empty_stack(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        Ok(parse_lines::<TaskLine>(&out)
            .into_iter()
            .map(|t| Task {
                service: task_service(&t.name).to_string(),
                running: t.current_state.starts_with("Running"),
                id: t.id,
            })
            .collect())
    }

    fn service_secret_refs(&self, service_id: &str, cancel: &Cancel) -> Result<Vec<ObjectId>> {
        let out = self.run(
            Invocation::new([
                "service",
                "inspect",
                "--format",
                "{{json .Spec.TaskTemplate.ContainerSpec.Secrets}}",
                service_id,
            ]),
            cancel,
        )?;
        parse_secret_refs(&out)
    }

    fn deploy(
        &self,
        manifest: &Path,
        stack: &str,
        variables: &Variables,
        cancel: &Cancel,
    ) -> Result<()> {
        let manifest = manifest.display().to_string();
        self.run(
            Invocation::new([
                "stack",
                "deploy",
                "--compose-file",
                manifest.as_str(),
                "--with-registry-auth",
                "--prune",
                stack,
            ])
            .env(variables)
            .stream(),
            cancel,
        )?;
        Ok(())
    }
}

impl ImageBuilder for Docker {
    fn login(
        &self,
        registry: Option<&str>,
        user: &str,
        password: &str,
        cancel: &Cancel,
    ) -> Result<()> {
        let mut args = vec!["login", "-u", user, "--password-stdin"];
        if let Some(registry) = registry {
            args.push(registry);
        }
        self.run(Invocation::new(args).stdin(password), cancel)?;
        Ok(())
    }

    fn build(
        &self,
        context: &Path,
        dockerfile: &Path,
        tags: &[String],
        cancel: &Cancel,
    ) -> Result<()> {
        let mut args = vec!["build".to_string()];
        for tag in tags {
            args.push("-t".to_string());
            args.push(tag.clone());
        }
        args.push("-f".to_string());
        args.push(dockerfile.display().to_string());
        args.push(context.display().to_string());
        self.run(Invocation::new(args).stream(), cancel)?;
        Ok(())
    }

    fn push(&self, reference: &str, cancel: &Cancel) -> Result<()> {
        self.run(Invocation::new(["push", reference]).stream(), cancel)?;
        Ok(())
    }
}
