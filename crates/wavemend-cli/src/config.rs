//! Loading of the application profile table.

use std::path::Path;

use anyhow::{Context, Result};
use wavemend_core::ProfileTable;

/// Reads a profile table from a JSON file, or returns the built-in table.
pub fn load_profiles(path: Option<&Path>) -> Result<ProfileTable> {
    let Some(path) = path else {
        return Ok(ProfileTable::builtin());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read profiles file: {}", path.display()))?;
    let table = ProfileTable::from_json(&content)
        .with_context(|| format!("Failed to parse profiles file: {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded application profiles");
    Ok(table)
}
