//! Persistence of the release history as JSON.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::domain::ReleaseHistory;
use crate::error::{ReleaseToolError, Result};

/// Decode a persisted history.
///
/// An absent or blank source, or a JSON `null`, gives an empty history. The
/// product name always comes from `product_name`, never from the document.
pub fn deserialize(source: Option<&str>, product_name: &str, origin: &Path) -> Result<ReleaseHistory> {
    let text = match source.map(str::trim) {
        Some(text) if !text.is_empty() => text,
        _ => return Ok(ReleaseHistory::empty(product_name)),
    };

    let decoded: Option<ReleaseHistory> =
        serde_json::from_str(text).map_err(|source| ReleaseToolError::History {
            path: origin.to_path_buf(),
            source,
        })?;

    Ok(match decoded {
        Some(history) => history.with_product_name(product_name),
        None => ReleaseHistory::empty(product_name),
    })
}

/// Encode a history. Output is stable for equal values.
pub fn serialize(history: &ReleaseHistory) -> Result<String> {
    let mut json = serde_json::to_string_pretty(history)?;
    json.push('\n');
    Ok(json)
}

/// Load the history at `path`, falling back to an empty one
pub fn load(path: &Path, product_name: &str) -> Result<ReleaseHistory> {
    let source = match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no release history yet");
            None
        }
        Err(e) => return Err(ReleaseToolError::io(path, e)),
    };

    let history = deserialize(source.as_deref(), product_name, path)?;
    debug!(
        path = %path.display(),
        releases = history.releases().len(),
        "loaded release history"
    );
    Ok(history)
}

pub fn save(path: &Path, history: &ReleaseHistory) -> Result<()> {
    let json = serialize(history)?;
    fs::write(path, json).map_err(|e| ReleaseToolError::io(path, e))?;
    debug!(path = %path.display(), "saved release history");
    Ok(())
}
