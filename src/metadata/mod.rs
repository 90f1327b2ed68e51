//! Build metadata patching
//!
//! After a release the new version is written into the build files of the
//! project (Cargo manifests, npm packages, MSBuild projects and
//! `AssemblyInfo.cs` sources) so that built artifacts report it.
//!
//! # Overview
//!
//! The [MetadataPatcher] trait is the seam the release pipeline depends on.
//! Implementations:
//!
//! - [regex_patcher::RegexPatcher]: rewrites version fields in place using
//!   regular expressions, leaving the rest of each file untouched
//! - [mock::RecordingPatcher]: records calls without touching any file
//!
//! [discover] walks a directory tree and returns every file one of the
//! [MetadataFormat]s recognises.

pub mod mock;
pub mod regex_patcher;

pub use mock::RecordingPatcher;
pub use regex_patcher::RegexPatcher;

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::domain::Version;
use crate::error::{ReleaseToolError, Result};

/// Build file formats that carry a product version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataFormat {
    /// `Cargo.toml`
    Cargo,
    /// `package.json`
    Npm,
    /// `*.csproj`
    MsBuild,
    /// `AssemblyInfo.cs`
    AssemblyInfo,
}

impl MetadataFormat {
    /// Recognise a file by its name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        match name {
            "Cargo.toml" => Some(MetadataFormat::Cargo),
            "package.json" => Some(MetadataFormat::Npm),
            "AssemblyInfo.cs" => Some(MetadataFormat::AssemblyInfo),
            _ if name.ends_with(".csproj") => Some(MetadataFormat::MsBuild),
            _ => None,
        }
    }
}

/// Applies a version to one build metadata file
///
/// Implementors change only version-bearing fields and leave everything
/// else in the file as it was.
pub trait MetadataPatcher {
    /// Patch `path` to carry `version`
    ///
    /// # Returns
    /// * `Ok(true)` - The file was rewritten
    /// * `Ok(false)` - The file is not a recognised format, or already up to date
    /// * `Err` - If the file cannot be read or written
    fn patch_file(&self, path: &Path, version: Version) -> Result<bool>;
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "target" || name == "node_modules"
}

/// Find every recognised build metadata file under `root`.
///
/// Hidden directories, `target` and `node_modules` are not descended into.
/// Results are sorted so patching order is stable.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            match e.into_io_error() {
                Some(io) => ReleaseToolError::io(path, io),
                None => ReleaseToolError::patch(path, "filesystem loop detected"),
            }
        })?;

        if entry.file_type().is_file() && MetadataFormat::from_path(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }

    files.sort();
    debug!(root = %root.display(), count = files.len(), "discovered metadata files");
    Ok(files)
}
