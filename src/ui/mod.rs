//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive confirmation and user input handling

use std::io::Write;

use console::Term;

use crate::error::Result;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_status, display_success, format_change, format_setting,
};

/// Blocking yes/no question asked before a release is written.
pub trait Confirm {
    /// Ask `prompt` and wait for an answer.
    ///
    /// # Returns
    /// * `Ok(true)` - The user agreed to go ahead
    /// * `Ok(false)` - The user declined
    /// * `Err` - If reading input fails
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Asks on the terminal and blocks until a line is entered.
///
/// Default is to confirm; the user must enter 'n' or 'no' to decline.
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        let mut term = Term::stdout();
        write!(term, "\n{} (Y/n): ", prompt)?;
        term.flush()?;

        let input = term.read_line()?;
        Ok(accepts(&input))
    }
}

/// Always agrees; for automated environments.
#[derive(Debug, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Interpret an answer to a default-yes question
pub fn accepts(response: &str) -> bool {
    let response = response.trim().to_lowercase();
    !(response == "n" || response == "no")
}
