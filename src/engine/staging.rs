//! Staging of in-memory uploads as temporary files
//!
//! The engines only accept file paths, so every uploaded buffer is written
//! to the temp directory under a collision-resistant name and removed again
//! once the call that staged it is done with it.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::EngineError;

/// Separator between the on-disk path and the original name in engine argv
pub const ENGINE_TOKEN_SEPARATOR: &str = "::";

/// Infix the sanitize engine appends to the files it writes
const SANITIZED_OUTPUT_MARKER: &str = ".sanitized";

#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
    prefix: String,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to a fresh temp file carrying `name`'s extension
    ///
    /// # Errors
    /// Returns `EngineError::Staging` if the file cannot be written
    pub fn stage(&self, name: &str, bytes: &[u8]) -> Result<StagedFile, EngineError> {
        let path = self.root.join(self.temp_name(name));

        fs::write(&path, bytes).map_err(|source| EngineError::Staging {
            name: name.to_string(),
            source,
        })?;

        log::debug!("[staging] {} -> {}", name, path.display());
        Ok(StagedFile {
            path,
            original_name: name.to_string(),
            owned: true,
        })
    }

    /// Remove sanitizer outputs left behind by earlier sessions
    ///
    /// The sanitize engine writes `<staged>.sanitized` (and sometimes
    /// `<staged>.sanitized.report.txt`) next to a staged upload. Those files
    /// must outlive the call so the UI can save them, so they are swept once
    /// at startup instead. Only names carrying this area's prefix are touched.
    ///
    /// # Returns
    /// The number of files removed
    pub fn sweep_stale_outputs(&self) -> usize {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("[staging] cannot list {}: {}", self.root.display(), e);
                return 0;
            }
        };

        let owned_prefix = format!("{}_", self.prefix);
        let mut removed = 0;
        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(&owned_prefix) || !name.contains(SANITIZED_OUTPUT_MARKER) {
                continue;
            }
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }

            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("[staging] failed to sweep {}: {}", entry.path().display(), e),
            }
        }

        if removed > 0 {
            log::info!("[staging] swept {} stale output(s) from {}", removed, self.root.display());
        }
        removed
    }

    /// `<prefix>_<unix millis>_<random><.ext>`
    fn temp_name(&self, name: &str) -> String {
        format!(
            "{}_{}_{}{}",
            self.prefix,
            chrono::Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            extension_suffix(name)
        )
    }
}

/// Lower-cased `.ext` of an uploaded name, or "" if it has none
///
/// Only ASCII alphanumeric extensions are kept so the untrusted name can
/// never add path components to the temp path.
pub fn extension_suffix(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!(".{}", ext.to_ascii_lowercase())
        }
        _ => String::new(),
    }
}

/// A file handed to an engine by path
///
/// Files created by [`StagingArea::stage`] are owned and deleted on
/// [`StagedFile::release`] or drop, whichever comes first. Files created with
/// [`StagedFile::external`] belong to the caller and are never deleted.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    original_name: String,
    owned: bool,
}

impl StagedFile {
    /// Wrap a path the caller already persisted
    pub fn external(path: impl Into<PathBuf>, original_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            original_name: original_name.into(),
            owned: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    /// `<path>::<original name>` as the scan engine expects it
    pub fn engine_token(&self) -> String {
        format!(
            "{}{}{}",
            self.path.display(),
            ENGINE_TOKEN_SEPARATOR,
            self.original_name
        )
    }

    /// Delete the file if this handle owns it
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if !self.owned {
            return;
        }
        self.owned = false;

        // Cleanup never replaces the result of the guarded operation
        match fs::remove_file(&self.path) {
            Ok(()) => log::debug!("[staging] released {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("[staging] failed to remove {}: {}", self.path.display(), e),
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        self.remove();
    }
}
