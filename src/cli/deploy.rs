//! Deploy command.

use tracing::info;

use crate::cli::{output, Context, DeployArgs, Globals};
use crate::core::deploy::{DeployOptions, DeployReport, Deployer};
use crate::error::Result;

/// Build, version secrets and deploy the configured stack.
pub fn execute(globals: &Globals, args: &DeployArgs) -> Result<()> {
    let ctx = Context::load(globals)?;

    let opts = DeployOptions {
        build: args.build,
        with_secrets: if args.with_secrets {
            true
        } else if args.no_secrets {
            false
        } else {
            ctx.config.deploy.with_secrets
        },
        prune: ctx.config.deploy.prune,
        dry_run: args.dry_run,
        tag: args.tag.clone(),
    };
    info!(?opts, environment = ?ctx.config.environment, "starting deploy");

    let docker = if opts.dry_run {
        ctx.offline_docker()
    } else {
        ctx.docker()?
    };

    let report = Deployer::new(&docker, &docker, &docker).run(
        &ctx.config,
        &ctx.vars,
        &opts,
        &ctx.cancel,
    )?;

    if report.dry_run {
        // manifest only, so it can be piped
        print!("{}", report.manifest);
        return Ok(());
    }

    summarize(&ctx, &report);
    Ok(())
}

fn summarize(ctx: &Context, report: &DeployReport) {
    if let Some(env) = &ctx.config.environment {
        output::kv("environment", env);
    }
    if report.logged_in {
        output::kv("registry", "logged in");
    }
    for (service, image) in &report.images {
        output::success(&format!("built {} → {}", service, output::name(image)));
    }

    if let Some(secrets) = &report.secrets {
        if secrets.mapping.is_empty() {
            output::warn("no ROLLWAVE_SECRET_* variables found");
        }
        for name in &secrets.created {
            output::success(&format!("created secret {}", output::name(name)));
        }
        if !secrets.existing.is_empty() {
            output::dimmed(&format!("{} secret(s) unchanged", secrets.existing.len()));
        }
    }
    for name in &report.unmatched_secrets {
        output::warn(&format!("secret {} is declared but not set", name));
    }

    output::success(&format!("deployed stack {}", output::name(&report.stack)));

    if let Some(pruned) = &report.prune {
        for secret in &pruned.deleted {
            output::dimmed(&format!("pruned {}", secret.name));
        }
        for (secret, reason) in &pruned.failed {
            output::warn(&format!("could not prune {}: {}", secret.name, reason));
        }
    }
    if let Some(err) = &report.prune_error {
        output::warn(&format!("post-deploy prune failed: {}", err));
    }
}
