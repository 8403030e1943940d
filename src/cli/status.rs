//! Status command.

use crate::cli::{output, Context, Globals};
use crate::core::status::status;
use crate::error::Result;

/// Show the stack's services with running and desired replicas.
pub fn execute(globals: &Globals) -> Result<()> {
    let ctx = Context::load(globals)?;
    let stack = ctx.config.require_stack()?;
    let docker = ctx.docker()?;

    let rows = status(&docker, stack, &ctx.cancel)?;

    output::section(&format!("Stack {}", stack));
    if rows.is_empty() {
        output::dimmed("no services running");
        return Ok(());
    }

    let width = rows.iter().map(|r| r.name.len()).max().unwrap_or(0);
    for row in &rows {
        let marker = if row.healthy() { "✓" } else { "⚠" };
        let mut line = format!(
            "{} {:width$}  {:>12}  {}",
            marker,
            row.name,
            row.replicas(),
            row.image,
            width = width
        );
        if !row.ports.is_empty() {
            line.push_str(&format!("  {}", row.ports));
        }
        println!("  {}", line);
    }
    Ok(())
}
