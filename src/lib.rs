//! Rollwave - zero-downtime stack deploys with versioned secrets.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Write a starter rollwave.toml
//! │   ├── deploy        # Build, version secrets, deploy
//! │   ├── secrets       # List local secrets, sync to the cluster
//! │   ├── prune         # Remove unused secret versions
//! │   ├── status        # Service replica overview
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── config        # rollwave.toml / rollwave.yml and overlays
//!     ├── env           # Variable map from process env and .env
//!     ├── secrets/      # Content-addressed naming and versioning
//!     ├── manifest/     # Compose model and rewrites
//!     ├── build         # Image build, tag and push
//!     ├── deploy        # Deploy driver
//!     ├── prune         # Unused secret removal
//!     ├── status        # Stack status
//!     └── swarm/        # Cluster backends
//!         ├── mod       # SecretStore, Orchestrator, ImageBuilder traits
//!         ├── docker    # docker CLI implementation
//!         └── memory    # In-process cluster
//! ```
//!
//! # Features
//!
//! - Secrets named by content hash, so a changed value is a new object and
//!   running services keep the version they started with
//! - Compose manifests rewritten to external secret references and pushed images
//! - Per-environment config overlays
//! - Pruning of secret versions no service references

pub mod cli;
pub mod core;
pub mod error;
