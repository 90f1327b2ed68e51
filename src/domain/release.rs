use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use super::change::Change;
use super::version::Version;
use crate::error::{ReleaseToolError, Result};

/// A published version together with the changes it shipped.
///
/// Changes are kept ordered from most to least severe; changes of the same
/// kind keep the order they were recorded in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReleaseRecord")]
pub struct Release {
    version: Version,
    changes: Vec<Change>,
}

#[derive(Deserialize)]
struct ReleaseRecord {
    version: Version,
    #[serde(default)]
    changes: Vec<Change>,
}

impl From<ReleaseRecord> for Release {
    fn from(record: ReleaseRecord) -> Self {
        Release::new(record.version, record.changes)
    }
}

impl Release {
    pub fn new(version: Version, mut changes: Vec<Change>) -> Self {
        // stable sort keeps recording order within a kind
        changes.sort_by_key(|change| Reverse(change.kind.severity()));
        Release { version, changes }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }
}

/// All releases ever made for a product, newest first.
///
/// Values are never edited; every `with_*` method builds a new history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ReleaseHistoryRecord", rename_all = "camelCase")]
pub struct ReleaseHistory {
    product_name: String,
    releases: Vec<Release>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseHistoryRecord {
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    releases: Vec<Release>,
}

impl From<ReleaseHistoryRecord> for ReleaseHistory {
    fn from(record: ReleaseHistoryRecord) -> Self {
        ReleaseHistory::new(record.product_name, record.releases)
    }
}

impl ReleaseHistory {
    /// Build a history, sorting releases by descending version
    pub fn new(product_name: impl Into<String>, mut releases: Vec<Release>) -> Self {
        releases.sort_by_key(|release| Reverse(release.version));
        ReleaseHistory {
            product_name: product_name.into(),
            releases,
        }
    }

    /// A history with no releases yet
    pub fn empty(product_name: impl Into<String>) -> Self {
        ReleaseHistory::new(product_name, Vec::new())
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    /// Version of the newest release, `None` before the first release
    pub fn current_version(&self) -> Option<Version> {
        self.releases.first().map(Release::version)
    }

    pub fn with_product_name(&self, product_name: impl Into<String>) -> Self {
        ReleaseHistory::new(product_name, self.releases.clone())
    }

    /// Append a release; its version must be above the current version.
    pub fn with_new_release(&self, release: Release) -> Result<Self> {
        if let Some(current) = self.current_version() {
            if release.version <= current {
                return Err(ReleaseToolError::VersionNotIncreasing {
                    current,
                    new: release.version,
                });
            }
        }

        let mut releases = self.releases.clone();
        releases.push(release);
        Ok(ReleaseHistory::new(self.product_name.clone(), releases))
    }

    /// Projection holding just the newest release, for short changelogs
    pub fn with_only_latest_release(&self) -> Self {
        ReleaseHistory::new(
            self.product_name.clone(),
            self.releases.iter().take(1).cloned().collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChangeKind;

    fn release(major: u32, minor: u32, patch: u32) -> Release {
        Release::new(
            Version::new(major, minor, patch),
            vec![Change::new(ChangeKind::BugFix, "fix")],
        )
    }

    #[test]
    fn test_release_sorts_changes_by_severity() {
        let release = Release::new(
            Version::new(1, 0, 0),
            vec![
                Change::new(ChangeKind::BugFix, "a"),
                Change::new(ChangeKind::NewFeature, "b"),
                Change::new(ChangeKind::BugFix, "c"),
                Change::new(ChangeKind::BreakingChange, "d"),
                Change::new(ChangeKind::NewFeature, "e"),
            ],
        );

        let order: Vec<&str> = release
            .changes()
            .iter()
            .map(|c| c.description.as_str())
            .collect();
        assert_eq!(order, vec!["d", "b", "e", "a", "c"]);
    }

    #[test]
    fn test_empty_history_has_no_current_version() {
        let history = ReleaseHistory::empty("Widget");
        assert_eq!(history.current_version(), None);
        assert!(history.releases().is_empty());
    }

    #[test]
    fn test_new_sorts_descending() {
        let history = ReleaseHistory::new(
            "Widget",
            vec![release(1, 0, 0), release(1, 10, 0), release(1, 2, 0)],
        );
        let versions: Vec<String> = history
            .releases()
            .iter()
            .map(|r| r.version().to_string())
            .collect();
        assert_eq!(versions, vec!["1.10.0", "1.2.0", "1.0.0"]);
        assert_eq!(history.current_version(), Some(Version::new(1, 10, 0)));
    }

    #[test]
    fn test_with_new_release_puts_newest_first() {
        let history = ReleaseHistory::new("Widget", vec![release(1, 2, 3)]);
        let updated = history.with_new_release(release(1, 2, 4)).unwrap();

        assert_eq!(updated.releases().len(), 2);
        assert_eq!(updated.current_version(), Some(Version::new(1, 2, 4)));
        assert_eq!(updated.releases()[1].version(), Version::new(1, 2, 3));
        // the original value is untouched
        assert_eq!(history.releases().len(), 1);
    }

    #[test]
    fn test_with_new_release_rejects_non_increasing_version() {
        let history = ReleaseHistory::new("Widget", vec![release(2, 0, 0)]);
        assert!(matches!(
            history.with_new_release(release(2, 0, 0)),
            Err(ReleaseToolError::VersionNotIncreasing { .. })
        ));
        assert!(history.with_new_release(release(1, 9, 9)).is_err());
    }

    #[test]
    fn test_with_new_release_on_empty_history() {
        let history = ReleaseHistory::empty("Widget");
        let updated = history.with_new_release(release(1, 0, 0)).unwrap();
        assert_eq!(updated.current_version(), Some(Version::new(1, 0, 0)));
    }

    #[test]
    fn test_with_only_latest_release() {
        let history = ReleaseHistory::new("Widget", vec![release(1, 2, 3), release(1, 2, 4)]);
        let latest = history.with_only_latest_release();
        assert_eq!(latest.releases().len(), 1);
        assert_eq!(latest.current_version(), Some(Version::new(1, 2, 4)));

        let empty = ReleaseHistory::empty("Widget").with_only_latest_release();
        assert!(empty.releases().is_empty());
    }

    #[test]
    fn test_with_product_name() {
        let history = ReleaseHistory::new("Old", vec![release(1, 0, 0)]);
        let renamed = history.with_product_name("New");
        assert_eq!(renamed.product_name(), "New");
        assert_eq!(renamed.releases(), history.releases());
    }

    #[test]
    fn test_deserialize_restores_ordering() {
        let json = r#"{
            "productName": "Widget",
            "releases": [
                {"version": {"major": 1, "minor": 0, "patch": 0}, "changes": []},
                {"version": {"major": 1, "minor": 1, "patch": 0}, "changes": [
                    {"type": "BugFix", "description": "a"},
                    {"type": "NewFeature", "description": "b"}
                ]}
            ]
        }"#;

        let history: ReleaseHistory = serde_json::from_str(json).unwrap();
        assert_eq!(history.current_version(), Some(Version::new(1, 1, 0)));
        assert_eq!(
            history.releases()[0].changes()[0].kind,
            ChangeKind::NewFeature
        );
    }
}
