//! Core library components.
//!
//! This module contains the deployment engine: config resolution, secret
//! versioning, manifest rewriting, image builds, pruning and the cluster
//! backends they run against. Nothing here touches the process environment
//! or prints to the terminal.

pub mod build;
pub mod cancel;
pub mod config;
pub mod constants;
pub mod deploy;
pub mod domain;
pub mod env;
pub mod manifest;
pub mod prune;
pub mod secrets;
pub mod status;
pub mod swarm;
pub mod types;
