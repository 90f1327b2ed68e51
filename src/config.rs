use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Version;
use crate::error::{ReleaseToolError, Result};

/// File name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "releasetool.toml";

/// Represents the complete configuration for release-tool.
///
/// Contains output file locations, product settings and behavior options.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub product: ProductConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

fn default_release_history() -> String {
    "RELEASE-HISTORY.json".to_string()
}

fn default_version_file() -> String {
    "VERSION".to_string()
}

fn default_latest_changes() -> String {
    "LATEST-CHANGES.txt".to_string()
}

fn default_markdown_changelog() -> String {
    "CHANGELOG.md".to_string()
}

fn default_first_version() -> String {
    "1.0.0".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metadata_root() -> String {
    ".".to_string()
}

/// Locations of the files release-tool reads and writes.
///
/// An empty string turns an optional output off.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FilesConfig {
    #[serde(default = "default_release_history")]
    pub release_history: String,

    #[serde(default = "default_version_file")]
    pub version: String,

    #[serde(default = "default_latest_changes")]
    pub latest_changes: String,

    #[serde(default = "default_markdown_changelog")]
    pub markdown_changelog: String,

    #[serde(default)]
    pub html_changelog: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            release_history: default_release_history(),
            version: default_version_file(),
            latest_changes: default_latest_changes(),
            markdown_changelog: default_markdown_changelog(),
            html_changelog: String::new(),
        }
    }
}

/// Product identity and versioning baseline.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProductConfig {
    #[serde(default)]
    pub name: Option<String>,

    /// Version given to the very first release
    #[serde(default = "default_first_version")]
    pub first_version: String,
}

impl Default for ProductConfig {
    fn default() -> Self {
        ProductConfig {
            name: None,
            first_version: default_first_version(),
        }
    }
}

/// Configuration for behavior customization.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BehaviorConfig {
    /// Write the new version into build metadata files after a release
    #[serde(default = "default_true")]
    pub patch_metadata: bool,

    /// Do not ask for confirmation before writing a release
    #[serde(default)]
    pub skip_confirmation: bool,

    /// Directory searched for build metadata files
    #[serde(default = "default_metadata_root")]
    pub metadata_root: String,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        BehaviorConfig {
            patch_metadata: true,
            skip_confirmation: false,
            metadata_root: default_metadata_root(),
        }
    }
}

fn optional_path(value: &str) -> Option<&Path> {
    if value.trim().is_empty() {
        None
    } else {
        Some(Path::new(value))
    }
}

impl Config {
    pub fn release_history_path(&self) -> &Path {
        Path::new(&self.files.release_history)
    }

    pub fn latest_changes_path(&self) -> &Path {
        Path::new(&self.files.latest_changes)
    }

    pub fn version_path(&self) -> Option<&Path> {
        optional_path(&self.files.version)
    }

    pub fn markdown_changelog_path(&self) -> Option<&Path> {
        optional_path(&self.files.markdown_changelog)
    }

    pub fn html_changelog_path(&self) -> Option<&Path> {
        optional_path(&self.files.html_changelog)
    }

    pub fn metadata_root(&self) -> PathBuf {
        PathBuf::from(&self.behavior.metadata_root)
    }

    /// Configured product name, if any non-blank one is set
    pub fn product_name(&self) -> Option<&str> {
        self.product
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Product name, failing when none is configured
    pub fn require_product_name(&self) -> Result<&str> {
        self.product_name()
            .ok_or(ReleaseToolError::MissingProductName)
    }

    /// Parsed first-release version
    pub fn first_version(&self) -> Result<Version> {
        Version::parse(&self.product.first_version).map_err(|e| {
            ReleaseToolError::config(format!("product.first_version: {}", e))
        })
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `releasetool.toml` in current directory
/// 3. `.releasetool.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let path = if let Some(path) = config_path {
        PathBuf::from(path)
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        PathBuf::from(CONFIG_FILE_NAME)
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if user_path.exists() {
            user_path
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&path).map_err(|e| ReleaseToolError::io(&path, e))?;
    toml::from_str(&config_str)
        .map_err(|e| ReleaseToolError::config(format!("{}: {}", path.display(), e)))
}

/// Parse configuration from TOML text
pub fn parse_config(text: &str) -> Result<Config> {
    toml::from_str(text).map_err(|e| ReleaseToolError::config(e.to_string()))
}
