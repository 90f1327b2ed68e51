use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Version;

/// A single problem found while parsing the pending changes file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based line number
    pub line: usize,
    pub message: String,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

/// Unified error type for release-tool operations
#[derive(Error, Debug)]
pub enum ReleaseToolError {
    #[error("No command was specified!")]
    NoCommand,

    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("No product name was specified! Use --product-name=\"...\" or set [product] name in releasetool.toml")]
    MissingProductName,

    #[error("{} could not be parsed. The following errors were found:\n\n{}", path.display(), join_lines(errors))]
    ChangeNotes {
        path: PathBuf,
        errors: Vec<LineError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Release cancelled by user")]
    Cancelled,

    #[error("New version {new} must be greater than the current version {current}")]
    VersionNotIncreasing { current: Version, new: Version },

    #[error("Release history {} could not be decoded: {source}", path.display())]
    History {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode release history: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to patch {}: {message}", path.display())]
    Patch { path: PathBuf, message: String },

    #[error("Invalid patch pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("{} output step(s) failed:\n{}", .0.len(), .0.join("\n"))]
    Artifacts(Vec<String>),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-tool
pub type Result<T> = std::result::Result<T, ReleaseToolError>;

fn join_lines(errors: &[LineError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl ReleaseToolError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseToolError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseToolError::Version(msg.into())
    }

    /// Wrap an I/O failure together with the file it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ReleaseToolError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn patch(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        ReleaseToolError::Patch {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Errors caused by user input or configuration.
    ///
    /// These are reported as a single message without diagnostic detail;
    /// everything else is unexpected and carries its full error chain.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ReleaseToolError::NoCommand
                | ReleaseToolError::UnknownCommand(_)
                | ReleaseToolError::MissingProductName
                | ReleaseToolError::ChangeNotes { .. }
                | ReleaseToolError::Config(_)
                | ReleaseToolError::Version(_)
                | ReleaseToolError::Cancelled
        )
    }
}
