//! Pending change notes.
//!
//! The pending changes file is a line-oriented list of `TAG: description`
//! entries collected between releases. Parsing never stops at the first bad
//! line: every problem is collected so the whole file can be fixed in one go.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::domain::{Change, ChangeKind};
use crate::error::{LineError, ReleaseToolError, Result};

/// Skeleton written to the pending changes file after every release.
pub const BLANK_TEMPLATE: &str = "\
# Every time you make a change, you should add a line to this file, along with a prefix to tag what sort of change it was (FIX/FEATURE/BREAKING).
# Each time a release is created, the changes will be moved from this file into the changelog. The type of changes included in a release determine what happens to its version number:
# - If any BREAKING changes are included, a new major version will be released
# - If no BREAKING changes are included, but there are one or more FEATUREs, a new minor version will be released
# - If only FIXes have been made, only the patch version of the release will be incremented
# - If no changes are listed here, a release cannot be made
#
# Do not edit any other part of this file - it will be regenerated next release and your changes will be lost!
#
# Examples:
#
# FIX: Fixed widget rendering [JIRA-123]
# FEATURE: Added gadget info screen [JIRA-456]
# BREAKING: Change API schema [JIRA-789]

";

/// Every problem found in a change notes source. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNoteErrors(Vec<LineError>);

impl ChangeNoteErrors {
    pub fn errors(&self) -> &[LineError] {
        &self.0
    }

    pub fn into_errors(self) -> Vec<LineError> {
        self.0
    }
}

impl fmt::Display for ChangeNoteErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ChangeNoteErrors {}

/// Parse change notes from text.
///
/// Blank lines and lines starting with `#` are ignored. Any other line must
/// look like `FIX: ...`, `FEATURE: ...` or `BREAKING: ...`. Changes come back
/// in the order they were written.
pub fn parse_changes<'a, I>(lines: I) -> std::result::Result<Vec<Change>, ChangeNoteErrors>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut changes = Vec::new();
    let mut errors = Vec::new();

    for (index, raw) in lines.into_iter().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (tag, description) = match line.split_once(':') {
            Some((tag, rest)) => (tag, rest.trim()),
            None => (line, ""),
        };

        if description.is_empty() {
            errors.push(LineError {
                line: line_number,
                message: "Change description cannot be blank".to_string(),
            });
            continue;
        }

        match ChangeKind::from_tag(tag) {
            Some(kind) => changes.push(Change::new(kind, description)),
            None => errors.push(LineError {
                line: line_number,
                message: format!("Unknown change type '{}'", tag),
            }),
        }
    }

    if errors.is_empty() {
        Ok(changes)
    } else {
        Err(ChangeNoteErrors(errors))
    }
}

/// Read pending changes from a file. A missing file means no changes.
pub fn read_changes(path: &Path) -> Result<Vec<Change>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no pending changes file");
            return Ok(Vec::new());
        }
        Err(e) => return Err(ReleaseToolError::io(path, e)),
    };

    let content = content.trim_start_matches('\u{feff}');
    let changes = parse_changes(content.lines()).map_err(|e| ReleaseToolError::ChangeNotes {
        path: path.to_path_buf(),
        errors: e.into_errors(),
    })?;
    debug!(path = %path.display(), count = changes.len(), "read pending changes");
    Ok(changes)
}

/// Write the blank skeleton to `path`.
///
/// With `overwrite` false an existing file is left alone. Returns whether
/// the file was written.
pub fn write_blank_template(path: &Path, overwrite: bool) -> Result<bool> {
    if !overwrite && path.exists() {
        return Ok(false);
    }

    fs::write(path, BLANK_TEMPLATE).map_err(|e| ReleaseToolError::io(path, e))?;
    Ok(true)
}
