//! Init command - write a starter config.

use tracing::info;

use crate::cli::{output, Globals};
use crate::core::config;
use crate::core::constants::DEFAULT_CONFIG_FILE;
use crate::error::Result;

/// Write `rollwave.toml` (or the `--config` path) in the current directory.
pub fn execute(globals: &Globals, project: Option<String>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let path = globals
        .config
        .clone()
        .unwrap_or_else(|| cwd.join(DEFAULT_CONFIG_FILE));

    let project = project.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(sanitize)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "app".to_string())
    });

    config::write_template(&path, &project)?;
    info!(path = %path.display(), project = %project, "wrote config template");

    output::success(&format!("created {}", path.display()));
    output::hint("edit the stack name, then run: rollwave deploy");
    Ok(())
}

/// Stack names allow letters, digits, `-` and `_`.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
