use crate::domain::{Change, Version, VersionBump};
use crate::error::Result;

/// Decides how far the version moves for a set of pending changes
pub struct VersionAnalyzer {
    first_version: Version,
}

impl VersionAnalyzer {
    /// Create an analyzer; `first_version` is used for the very first release
    pub fn new(first_version: Version) -> Self {
        VersionAnalyzer { first_version }
    }

    /// Classify a set of changes.
    ///
    /// The most severe change wins: one breaking change makes the whole set
    /// a major bump no matter how many fixes and features come with it.
    pub fn analyze(&self, changes: &[Change]) -> VersionBump {
        changes
            .iter()
            .map(|change| change.kind.bump())
            .max()
            .unwrap_or(VersionBump::None)
    }

    /// Compute the version for the next release.
    ///
    /// Returns `None` for `VersionBump::None`: nothing to release, so the
    /// current version stays. The first release always gets the configured
    /// first version regardless of the bump.
    pub fn next_version(
        &self,
        current: Option<Version>,
        bump: VersionBump,
    ) -> Result<Option<Version>> {
        if bump == VersionBump::None {
            return Ok(None);
        }

        match current {
            Some(version) => version.bump(bump).map(Some),
            None => Ok(Some(self.first_version)),
        }
    }
}

impl Default for VersionAnalyzer {
    fn default() -> Self {
        VersionAnalyzer::new(Version::new(1, 0, 0))
    }
}
