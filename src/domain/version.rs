use crate::error::{ReleaseToolError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product version (major.minor.patch)
///
/// Ordering is lexicographic on the three components, which the field order
/// and the derived `Ord` give us for free.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a canonical `major.minor.patch` string.
    ///
    /// Pre-release and build qualifiers (`1.0.0-beta`, `1.0.0+abc`) are
    /// rejected since releases only ever carry the plain triple.
    pub fn parse(text: &str) -> Result<Self> {
        let parsed = semver::Version::parse(text.trim()).map_err(|e| {
            ReleaseToolError::version(format!(
                "Invalid version '{}' - expected X.Y.Z ({})",
                text, e
            ))
        })?;

        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(ReleaseToolError::version(format!(
                "Version '{}' carries a qualifier; only X.Y.Z is supported",
                text
            )));
        }

        let component = |value: u64, name: &str| {
            u32::try_from(value).map_err(|_| {
                ReleaseToolError::version(format!("{} version {} is too large", name, value))
            })
        };

        Ok(Version {
            major: component(parsed.major, "Major")?,
            minor: component(parsed.minor, "Minor")?,
            patch: component(parsed.patch, "Patch")?,
        })
    }

    pub fn increment_major(&self) -> Result<Self> {
        Ok(Version::new(next_component(self.major, "Major")?, 0, 0))
    }

    pub fn increment_minor(&self) -> Result<Self> {
        Ok(Version::new(
            self.major,
            next_component(self.minor, "Minor")?,
            0,
        ))
    }

    pub fn increment_patch(&self) -> Result<Self> {
        Ok(Version::new(
            self.major,
            self.minor,
            next_component(self.patch, "Patch")?,
        ))
    }

    /// Bump version according to bump type.
    ///
    /// `VersionBump::None` leaves the version as it is. Fails when the
    /// bumped component is already at `u32::MAX`.
    pub fn bump(&self, bump_type: VersionBump) -> Result<Self> {
        match bump_type {
            VersionBump::Major => self.increment_major(),
            VersionBump::Minor => self.increment_minor(),
            VersionBump::Patch => self.increment_patch(),
            VersionBump::None => Ok(*self),
        }
    }

    /// The same major version with minor and patch zeroed
    pub fn round_to_major(&self) -> Self {
        Version::new(self.major, 0, 0)
    }
}

fn next_component(value: u32, name: &str) -> Result<u32> {
    value.checked_add(1).ok_or_else(|| {
        ReleaseToolError::version(format!(
            "version component overflow: {} version {} cannot be incremented",
            name, value
        ))
    })
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = ReleaseToolError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

/// Render an optional version, using `(None)` when there has been no release yet
pub fn display_version(version: Option<Version>) -> String {
    match version {
        Some(v) => v.to_string(),
        None => "(None)".to_string(),
    }
}

/// Version increment magnitude derived from a set of changes.
///
/// Variants are declared in ascending order of magnitude so that the
/// largest bump across many changes is simply the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VersionBump {
    None,
    Patch,
    Minor,
    Major,
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersionBump::None => "none",
            VersionBump::Patch => "patch",
            VersionBump::Minor => "minor",
            VersionBump::Major => "major",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("one.two.three").is_err());
        assert!(Version::parse("").is_err());
    }

    #[test]
    fn test_version_parse_rejects_qualifiers() {
        assert!(Version::parse("1.0.0-beta.1").is_err());
        assert!(Version::parse("1.0.0+build.5").is_err());
    }

    #[test]
    fn test_version_round_trip() {
        for v in [
            Version::new(0, 0, 0),
            Version::new(1, 0, 0),
            Version::new(12, 34, 56),
            Version::new(u32::MAX, 0, u32::MAX),
        ] {
            assert_eq!(v.to_string().parse::<Version>().unwrap(), v);
        }
    }

    #[test]
    fn test_version_increments() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.increment_major().unwrap(), Version::new(2, 0, 0));
        assert_eq!(v.increment_minor().unwrap(), Version::new(1, 3, 0));
        assert_eq!(v.increment_patch().unwrap(), Version::new(1, 2, 4));
        // original value is untouched
        assert_eq!(v, Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_bump_none_is_identity() {
        let v = Version::new(4, 5, 6);
        assert_eq!(v.bump(VersionBump::None).unwrap(), v);
        assert_eq!(v.bump(VersionBump::Minor).unwrap(), Version::new(4, 6, 0));
    }

    #[test]
    fn test_increment_overflow_is_error() {
        let v = Version::new(u32::MAX, u32::MAX, u32::MAX);
        for bump in [VersionBump::Patch, VersionBump::Minor, VersionBump::Major] {
            let err = v.bump(bump).unwrap_err();
            assert!(matches!(err, ReleaseToolError::Version(_)));
            assert!(err.to_string().contains("version component overflow"));
        }
        // only the bumped component matters
        assert_eq!(
            Version::new(1, 2, u32::MAX).bump(VersionBump::Minor).unwrap(),
            Version::new(1, 3, 0)
        );
    }

    #[test]
    fn test_version_ordering_is_numeric() {
        assert!(Version::new(1, 10, 0) > Version::new(1, 9, 99));
        assert!(Version::new(2, 0, 0) > Version::new(1, 99, 99));
        assert!(Version::new(1, 2, 10) > Version::new(1, 2, 9));
        assert_eq!(
            Version::new(1, 2, 3).cmp(&Version::new(1, 2, 3)),
            std::cmp::Ordering::Equal
        );
    }

    #[test]
    fn test_round_to_major() {
        assert_eq!(Version::new(3, 4, 5).round_to_major(), Version::new(3, 0, 0));
    }

    #[test]
    fn test_display_version_sentinel() {
        assert_eq!(display_version(None), "(None)");
        assert_eq!(display_version(Some(Version::new(1, 0, 0))), "1.0.0");
    }

    #[test]
    fn test_bump_ordering() {
        assert!(VersionBump::Major > VersionBump::Minor);
        assert!(VersionBump::Minor > VersionBump::Patch);
        assert!(VersionBump::Patch > VersionBump::None);
    }
}
