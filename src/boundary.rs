use std::fmt;
use std::path::PathBuf;

use crate::domain::{display_version, Version};

/// Non-fatal situations met while preparing a release.
/// These are reported to the user but never stop the operation.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Nothing recorded in the pending changes file
    NoPendingChanges { current_version: Option<Version> },
    /// `init` found an existing pending changes file and kept it
    ChangesFileExists { path: PathBuf },
    /// Metadata patching was requested but there is no version to apply yet
    NoVersionToPatch,
    /// Metadata patching ran but found no build files
    NoMetadataFiles { root: PathBuf },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoPendingChanges { current_version } => write!(
                f,
                "No changes recorded since last release - the version will remain at {}. \
                 The output files will be regenerated but no new release can be made \
                 without recording at least one change.",
                display_version(*current_version)
            ),
            BoundaryWarning::ChangesFileExists { path } => {
                write!(f, "{} already exists, so not overwriting", path.display())
            }
            BoundaryWarning::NoVersionToPatch => {
                write!(f, "No release has been made yet, so there is no version to patch into build files")
            }
            BoundaryWarning::NoMetadataFiles { root } => {
                write!(f, "No build metadata files found under {}", root.display())
            }
        }
    }
}
