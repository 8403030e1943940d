//! Prune command.

use crate::cli::{output, Context, Globals};
use crate::core::prune::prune;
use crate::error::Result;

/// Delete the stack's unused secrets, or list them with `--dry-run`.
pub fn execute(globals: &Globals, dry_run: bool) -> Result<()> {
    let ctx = Context::load(globals)?;
    let stack = ctx.config.require_stack()?;
    let docker = ctx.docker()?;

    let report = prune(&docker, &docker, stack, dry_run, &ctx.cancel)?;

    output::section(&format!("Prune {}", stack));
    output::kv("scoped", report.scoped);
    output::kv("in use", report.in_use);

    if report.unused.is_empty() {
        output::dimmed("nothing to prune");
        return Ok(());
    }

    if dry_run {
        for secret in &report.unused {
            output::list_item(&format!("{} (would delete)", secret.name));
        }
        return Ok(());
    }

    for secret in &report.deleted {
        output::success(&format!("deleted {}", output::name(&secret.name)));
    }
    for (secret, reason) in &report.failed {
        output::warn(&format!("could not delete {}: {}", secret.name, reason));
    }
    Ok(())
}
