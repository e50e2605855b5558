//! Shared CLI output helpers for consistent terminal output.
//!
//! Color scheme (respects NO_COLOR):
//! - Green: success, checkmarks
//! - Red: errors
//! - Yellow: warnings
//! - Cyan: ids, commands, hints
//! - Bold: headers, important values
//! - Dimmed: secondary info

use std::fmt::Display;

use console::style;

const RULE_WIDTH: usize = 56;

/// Apply NO_COLOR before anything is printed.
pub fn init() {
    if std::env::var_os("NO_COLOR").is_some() {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }
}

/// Print a success message with checkmark (green).
///
/// Example: `✓ unlocked`
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green(), msg);
}

/// Print an error message to stderr (red).
///
/// Example: `✗ server unreachable`
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().for_stderr(), msg);
}

/// Print a warning message (yellow).
///
/// Example: `⚠ session expired`
pub fn warn(msg: &str) {
    println!("{} {}", style("⚠").yellow(), msg);
}

/// Print a hint message (cyan).
///
/// Example: `→ run: latchkey session`
pub fn hint(msg: &str) {
    println!("{} {}", style("→").cyan(), style(msg).cyan());
}

/// Print a bold header.
pub fn header(title: &str) {
    println!("{}", style(title).bold());
}

/// Print a key-value pair (label dimmed, value bold).
///
/// Example: `  server  http://localhost:8000`
pub fn kv(label: &str, value: impl Display) {
    println!("  {}  {}", style(label).dim(), style(value).bold());
}

/// Print a list item with bullet.
pub fn list_item(item: &str) {
    println!("  • {}", item);
}

/// Print a horizontal rule separator.
pub fn rule() {
    println!("{}", style("─".repeat(RULE_WIDTH)).dim());
}

/// Print a dimmed/secondary message.
///
/// Example: `no records`
pub fn dimmed(msg: &str) {
    println!("{}", style(msg).dim());
}

/// Print an empty line.
pub fn blank() {
    println!();
}

/// Print raw data (JSON, generated values) without decoration.
pub fn data(text: &str) {
    println!("{}", text);
}

/// Print a section header with a separator line.
///
/// Example:
/// ```text
/// Records
/// ────────────────────────────────────────────────────────
/// ```
pub fn section(title: &str) {
    blank();
    header(title);
    rule();
}

/// Format a command string in green.
pub fn cmd(c: &str) -> String {
    style(c).green().to_string()
}

/// Format a record or category id in cyan.
pub fn id(value: impl Display) -> String {
    style(format!("#{value}")).cyan().to_string()
}

/// Format a count in bold.
pub fn count(n: usize) -> String {
    style(n).bold().to_string()
}

/// `record` / `records` depending on `n`.
pub fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}
