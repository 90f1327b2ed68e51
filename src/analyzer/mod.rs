//! Analysis engine for determining version bumps from pending changes

pub mod version_analyzer;

pub use version_analyzer::VersionAnalyzer;
