//! Shared CLI output helpers for consistent terminal output.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, checkmarks
//! - Red: errors
//! - Yellow: warnings
//! - Cyan: names, hints
//! - Bold: headers, important values
//! - Dimmed: secondary info

use std::fmt::Display;

use console::{style, StyledObject};

const RULE_WIDTH: usize = 56;

/// Check if color output is disabled via NO_COLOR env var.
fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn styled<D>(val: D) -> StyledObject<D> {
    let s = style(val);
    if colors_enabled() {
        s
    } else {
        s.force_styling(false)
    }
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ deployed stack demo`
pub fn success(msg: &str) {
    println!("{} {}", styled("✓").green(), msg);
}

/// Print an error message to stderr (red).
///
/// Example: `✗ no config file found`
pub fn error(msg: &str) {
    eprintln!("{} {}", styled("✗").red().for_stderr(), msg);
}

/// Print a warning message (yellow).
///
/// Example: `⚠ post-deploy prune failed`
pub fn warn(msg: &str) {
    println!("{} {}", styled("⚠").yellow(), msg);
}

/// Print a hint message to stderr (cyan).
///
/// Example: `→ run: rollwave init`
pub fn hint(msg: &str) {
    eprintln!(
        "{} {}",
        styled("→").cyan().for_stderr(),
        styled(msg).cyan().for_stderr()
    );
}

/// Print a key-value pair (label dimmed, value bold).
///
/// Example: `  stack:  demo`
pub fn kv(label: &str, value: impl Display) {
    println!("  {}  {}", styled(label).dim(), styled(value.to_string()).bold());
}

/// Print a list item with bullet.
///
/// Example: `  • demo_DB_PASSWORD_6ca13d52`
pub fn list_item(item: &str) {
    println!("  • {}", item);
}

/// Format a secret, service or stack name in cyan for inline use.
pub fn name(n: &str) -> String {
    styled(n).cyan().to_string()
}

/// Print a dimmed/secondary message.
///
/// Example: `no services running`
pub fn dimmed(msg: &str) {
    println!("{}", styled(msg).dim());
}

/// Print a bold header line.
fn header(title: &str) {
    println!("{}", styled(title).bold());
}

/// Print a dimmed separator line.
fn rule() {
    println!("{}", styled("─".repeat(RULE_WIDTH)).dim());
}

/// Print a section header with a separator line.
///
/// Example:
/// ```text
/// Services
/// ────────────────────────────────────────────────────────
/// ```
pub fn section(title: &str) {
    println!();
    header(title);
    rule();
}
