use serde::{Deserialize, Serialize};
use std::fmt;

use super::version::VersionBump;

/// Kind of a recorded change.
///
/// Declared from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    BreakingChange,
    NewFeature,
    #[serde(alias = "Fix")]
    BugFix,
}

impl ChangeKind {
    /// Human-readable label used in changelogs
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::BreakingChange => "Breaking change",
            ChangeKind::NewFeature => "New feature",
            ChangeKind::BugFix => "Bug fix",
        }
    }

    /// Severity rank; higher is more severe
    pub fn severity(&self) -> u8 {
        match self {
            ChangeKind::BreakingChange => 3,
            ChangeKind::NewFeature => 2,
            ChangeKind::BugFix => 1,
        }
    }

    /// Version increment this kind of change calls for
    pub fn bump(&self) -> VersionBump {
        match self {
            ChangeKind::BreakingChange => VersionBump::Major,
            ChangeKind::NewFeature => VersionBump::Minor,
            ChangeKind::BugFix => VersionBump::Patch,
        }
    }

    /// Look up a kind from its change-note tag (`FIX`, `FEATURE`, `BREAKING`)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "FIX" => Some(ChangeKind::BugFix),
            "FEATURE" => Some(ChangeKind::NewFeature),
            "BREAKING" => Some(ChangeKind::BreakingChange),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ChangeKind::BreakingChange => "BREAKING",
            ChangeKind::NewFeature => "FEATURE",
            ChangeKind::BugFix => "FIX",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single change note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub description: String,
}

impl Change {
    pub fn new(kind: ChangeKind, description: impl Into<String>) -> Self {
        Change {
            kind,
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(ChangeKind::BreakingChange.label(), "Breaking change");
        assert_eq!(ChangeKind::NewFeature.label(), "New feature");
        assert_eq!(ChangeKind::BugFix.label(), "Bug fix");
    }

    #[test]
    fn test_severity_order() {
        assert!(ChangeKind::BreakingChange.severity() > ChangeKind::NewFeature.severity());
        assert!(ChangeKind::NewFeature.severity() > ChangeKind::BugFix.severity());
    }

    #[test]
    fn test_tags_round_trip() {
        for kind in [
            ChangeKind::BreakingChange,
            ChangeKind::NewFeature,
            ChangeKind::BugFix,
        ] {
            assert_eq!(ChangeKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ChangeKind::from_tag("fix"), None);
        assert_eq!(ChangeKind::from_tag("CHORE"), None);
    }

    #[test]
    fn test_change_json_shape() {
        let change = Change::new(ChangeKind::BugFix, "Fixed widget rendering");
        let json = serde_json::to_string(&change).unwrap();
        assert_eq!(
            json,
            r#"{"type":"BugFix","description":"Fixed widget rendering"}"#
        );
    }

    #[test]
    fn test_legacy_fix_spelling_is_accepted() {
        let change: Change =
            serde_json::from_str(r#"{"type":"Fix","description":"old entry"}"#).unwrap();
        assert_eq!(change.kind, ChangeKind::BugFix);
    }
}
