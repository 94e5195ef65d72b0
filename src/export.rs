//! Copying a sanitizer output to a user-chosen directory

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::security::path_validation::{join_file_name, validate_source_file, validate_target_dir};

/// Marker the sanitizer inserts into the names of its outputs
pub const SANITIZED_MARKER: &str = ".sanitized";

/// Upper bound on `name-N.ext` attempts before giving up
const MAX_SUFFIX: u32 = 10_000;

/// Destination basename for a sanitizer output
///
/// `report.docx.sanitized` becomes `report.docx`, `a.sanitized.hwp` becomes
/// `a.hwp`. The marker only counts as a whole dot-delimited token, and a
/// trailing one wins over an infix. Names without the marker, or that would
/// become empty, are kept.
pub fn sanitized_output_name(basename: &str) -> String {
    if let Some(stem) = basename
        .strip_suffix(SANITIZED_MARKER)
        .filter(|stem| !stem.is_empty())
    {
        return stem.to_string();
    }

    let infix = format!("{}.", SANITIZED_MARKER);
    match basename.find(&infix) {
        Some(idx) if idx > 0 => format!("{}.{}", &basename[..idx], &basename[idx + infix.len()..]),
        _ => basename.to_string(),
    }
}

/// Copy `src` into `dir` under its restored name
///
/// An existing file is never overwritten; `name-1.ext`, `name-2.ext`, ...
/// are tried instead.
///
/// # Returns
/// * `Ok(Some(path))` - Where the copy landed
/// * `Ok(None)` - `src` is not a file or `dir` is not a directory
/// * `Err` - The copy itself failed
pub fn save_sanitized_to(src: &str, dir: &str) -> Result<Option<PathBuf>> {
    let source = match validate_source_file(src) {
        Ok(path) => path,
        Err(e) => {
            log::warn!("[export] source rejected: {}", e);
            return Ok(None);
        }
    };
    let target_dir = match validate_target_dir(dir) {
        Ok(path) => path,
        Err(e) => {
            log::warn!("[export] target rejected: {}", e);
            return Ok(None);
        }
    };

    let basename = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .context("source path has no file name")?;

    let destination = free_destination(&target_dir, &sanitized_output_name(&basename))?;

    fs::copy(&source, &destination).with_context(|| {
        format!(
            "Failed to copy {} to {}",
            source.display(),
            destination.display()
        )
    })?;

    log::info!("[export] {} -> {}", source.display(), destination.display());
    Ok(Some(destination))
}

/// First path under `dir` for `name` that does not exist yet
fn free_destination(dir: &Path, name: &str) -> Result<PathBuf> {
    let first = join_file_name(dir, name)?;
    if !first.exists() {
        return Ok(first);
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{}", ext)),
        _ => (name, String::new()),
    };

    for n in 1..=MAX_SUFFIX {
        let candidate = join_file_name(dir, &format!("{}-{}{}", stem, n, ext))?;
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    anyhow::bail!("No free file name for {} in {}", name, dir.display())
}
