use std::cell::RefCell;
use std::path::{Path, PathBuf};

use super::MetadataPatcher;
use crate::domain::Version;
use crate::error::{ReleaseToolError, Result};

/// Patcher that records calls instead of touching files
#[derive(Default)]
pub struct RecordingPatcher {
    calls: RefCell<Vec<(PathBuf, Version)>>,
    failing: Option<PathBuf>,
}

impl RecordingPatcher {
    /// Create a new recorder with no calls
    pub fn new() -> Self {
        RecordingPatcher::default()
    }

    /// A recorder that fails whenever asked to patch `path`
    pub fn failing_on(path: impl Into<PathBuf>) -> Self {
        RecordingPatcher {
            calls: RefCell::new(Vec::new()),
            failing: Some(path.into()),
        }
    }

    /// Every `(path, version)` pair patched so far
    pub fn calls(&self) -> Vec<(PathBuf, Version)> {
        self.calls.borrow().clone()
    }
}

impl MetadataPatcher for RecordingPatcher {
    fn patch_file(&self, path: &Path, version: Version) -> Result<bool> {
        if self.failing.as_deref() == Some(path) {
            return Err(ReleaseToolError::patch(path, "simulated failure"));
        }
        self.calls.borrow_mut().push((path.to_path_buf(), version));
        Ok(true)
    }
}
