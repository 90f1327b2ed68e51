//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.

use console::style;

use crate::domain::Change;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Format one pending change as listed before a release is confirmed
pub fn format_change(change: &Change) -> String {
    format!(" - {} - {}", change.kind.label(), change.description)
}

/// Format the line shown for one effective configuration value
pub fn format_setting(name: &str, value: &str) -> String {
    format!(" {} = {}", name, value)
}
