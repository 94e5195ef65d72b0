//! Path validation module
//!
//! Checks applied to paths that arrive from the UI before the host touches
//! the file system on its behalf.

use anyhow::{anyhow, Result};
use std::path::{Component, Path, PathBuf};

/// Validate a UI-supplied path string and canonicalize it
///
/// # Returns
/// * `Ok(PathBuf)` - The canonical path
/// * `Err` - Null byte in the input, or the path does not exist
pub fn canonical_existing(raw: &str) -> Result<PathBuf> {
    // Reject paths with null bytes (potential exploit)
    if raw.contains('\0') {
        return Err(anyhow!("Null byte detected in path: {}", raw.escape_debug()));
    }

    Path::new(raw)
        .canonicalize()
        .map_err(|e| anyhow!("Invalid or non-existent path {}: {}", raw, e))
}

/// Validate that `raw` names an existing regular file
pub fn validate_source_file(raw: &str) -> Result<PathBuf> {
    let canonical = canonical_existing(raw)?;
    if !canonical.is_file() {
        return Err(anyhow!("Not a regular file: {}", canonical.display()));
    }
    Ok(canonical)
}

/// Validate that `raw` names an existing directory
pub fn validate_target_dir(raw: &str) -> Result<PathBuf> {
    let canonical = canonical_existing(raw)?;
    if !canonical.is_dir() {
        return Err(anyhow!("Not a directory: {}", canonical.display()));
    }
    Ok(canonical)
}

/// Join a bare file name onto `dir`, refusing anything that would leave it
///
/// # Security
/// `name` must be a single normal path component: no separators, no `..`,
/// no root or drive prefix.
pub fn join_file_name(dir: &Path, name: &str) -> Result<PathBuf> {
    if name.contains('\0') {
        return Err(anyhow!("Null byte detected in file name"));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(part)), None) if part == name => Ok(dir.join(part)),
        _ => Err(anyhow!("Not a plain file name: {}", name)),
    }
}
