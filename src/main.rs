//! Rollwave - compose-driven Docker Swarm deploys with versioned secrets.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rollwave::cli::output;
use rollwave::cli::{execute, Cli};
use rollwave::error::{ConfigError, DockerError, Error};

fn main() {
    let cli = Cli::parse();

    // ROLLWAVE_LOG wins over --verbose
    let filter = EnvFilter::try_from_env("ROLLWAVE_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("rollwave=debug")
        } else {
            EnvFilter::new("rollwave=warn")
        }
    });

    let json = std::env::var("ROLLWAVE_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    if let Err(e) = execute(cli.command, &cli.globals) {
        let suggestion = match &e {
            Error::Config(ConfigError::NotFound { .. }) => Some("run: rollwave init"),
            Error::Config(ConfigError::MissingField { .. }) => {
                Some("set [stack] name in rollwave.toml")
            }
            Error::Docker(DockerError::NotFound { .. }) => {
                Some("install docker or point ROLLWAVE_DOCKER at it")
            }
            Error::Cancelled => Some("raise --timeout to allow longer runs"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
