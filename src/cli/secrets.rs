//! Secrets commands.

use crate::cli::{output, Context, Globals};
use crate::core::constants::{ENV_FILE, SECRET_ENV_PREFIX};
use crate::core::domain::LogicalSecret;
use crate::core::env;
use crate::core::secrets::{self, Scope, Versioner};
use crate::error::Result;

/// List the secrets found in the environment with their values masked.
pub fn list(json: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let vars = env::collect(env::process_vars(), Some(&cwd.join(ENV_FILE)))?;
    let found = secrets::read(&vars, SECRET_ENV_PREFIX);

    if json {
        let entries: Vec<serde_json::Value> = found
            .iter()
            .map(|s| serde_json::json!({ "key": s.key(), "length": s.value().len() }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if found.is_empty() {
        output::dimmed(&format!("no {}* variables set", SECRET_ENV_PREFIX));
        return Ok(());
    }

    for secret in &found {
        println!("{}", masked(secret));
    }
    Ok(())
}

fn masked(secret: &LogicalSecret) -> String {
    format!("{}=**** (len={})", secret.key(), secret.value().len())
}

/// Create missing secret versions without deploying.
///
/// Flags override the config, and the config file is optional when
/// `--stack` is given.
pub fn sync(
    globals: &Globals,
    stack: Option<&str>,
    prefix: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let ctx = if stack.is_some() {
        Context::load_optional(globals)?
    } else {
        Context::load(globals)?
    };

    let stack = match stack.filter(|s| !s.trim().is_empty()) {
        Some(s) => s,
        None => ctx.config.require_stack()?,
    };
    let prefix = prefix.or_else(|| ctx.config.secret_prefix());

    let found = secrets::read(&ctx.vars, SECRET_ENV_PREFIX);
    if found.is_empty() {
        output::warn(&format!("no {}* variables set", SECRET_ENV_PREFIX));
        return Ok(());
    }

    let docker = if dry_run {
        ctx.offline_docker()
    } else {
        ctx.docker()?
    };
    let result = Versioner::new(&docker, Scope::new(stack, prefix))
        .dry_run(dry_run)
        .ensure(&found, &ctx.cancel)?;

    for name in &result.planned {
        output::list_item(&format!("{} (would create if missing)", name));
    }
    for name in &result.created {
        output::success(&format!("created {}", output::name(name)));
    }
    for name in &result.existing {
        output::dimmed(&format!("exists {}", name));
    }
    Ok(())
}
