//! Domain logic - versions, changes and the release history aggregate

pub mod change;
pub mod release;
pub mod version;

pub use change::{Change, ChangeKind};
pub use release::{Release, ReleaseHistory};
pub use version::{display_version, Version, VersionBump};
