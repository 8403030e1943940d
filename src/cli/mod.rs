//! Command-line interface.

pub mod completions;
pub mod context;
pub mod deploy;
pub mod init;
pub mod output;
pub mod prune;
pub mod secrets;
pub mod status;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub use context::Context;

/// Rollwave - compose-driven Docker Swarm deploys with versioned secrets.
#[derive(Parser)]
#[command(
    name = "rollwave",
    about = "Compose-driven Docker Swarm deploys with versioned secrets",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub globals: Globals,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct Globals {
    /// Config file (default: rollwave.toml, rollwave.yml or rollwave.yaml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Environment overlay to apply (e.g. staging, production)
    #[arg(short = 'e', long = "env", global = true, value_name = "NAME")]
    pub environment: Option<String>,

    /// docker binary to run
    #[arg(
        long,
        global = true,
        env = "ROLLWAVE_DOCKER",
        default_value = "docker",
        value_name = "BIN"
    )]
    pub docker: String,

    /// Give up and kill in-flight docker calls after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Write a starter rollwave.toml in the current directory
    Init {
        /// Project and stack name (default: directory name)
        #[arg(long)]
        project: Option<String>,
    },

    /// Build, version secrets and deploy the stack
    Deploy(DeployArgs),

    /// Work with ROLLWAVE_SECRET_* variables
    Secrets {
        #[command(subcommand)]
        action: SecretsAction,
    },

    /// Delete stack secrets no service references
    Prune {
        /// Show what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the stack's services and replica counts
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// `deploy` flags.
#[derive(Args, Debug, Clone, Default)]
pub struct DeployArgs {
    /// Build and push services with a build section
    #[arg(long)]
    pub build: bool,

    /// Version secrets before deploying (overrides deploy.with_secrets)
    #[arg(long, conflicts_with = "no_secrets")]
    pub with_secrets: bool,

    /// Skip secret versioning (overrides deploy.with_secrets)
    #[arg(long)]
    pub no_secrets: bool,

    /// Image tag to use instead of the git hash
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Print the rewritten manifest without touching the cluster
    #[arg(long)]
    pub dry_run: bool,
}

/// Secrets subcommands.
#[derive(Subcommand)]
pub enum SecretsAction {
    /// List secrets found in the environment (values masked)
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create missing secret versions in the cluster
    #[command(visible_alias = "swarm")]
    Sync {
        /// Stack name (overrides config)
        #[arg(long)]
        stack: Option<String>,

        /// Extra naming scope (overrides secrets.stack_prefix)
        #[arg(long)]
        prefix: Option<String>,

        /// Show the names that would be created
        #[arg(long)]
        dry_run: bool,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Execute a command.
pub fn execute(command: Command, globals: &Globals) -> crate::error::Result<()> {
    use Command::*;

    match command {
        Init { project } => init::execute(globals, project),
        Deploy(args) => deploy::execute(globals, &args),
        Secrets { action } => match action {
            SecretsAction::List { json } => secrets::list(json),
            SecretsAction::Sync {
                stack,
                prefix,
                dry_run,
            } => secrets::sync(globals, stack.as_deref(), prefix.as_deref(), dry_run),
        },
        Prune { dry_run } => prune::execute(globals, dry_run),
        Status => status::execute(globals),
        Completions { shell } => completions::execute(shell),
    }
}
