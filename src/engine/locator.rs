//! Locating the engine entry points
//!
//! An engine is the resolved runtime plus a script under the resource
//! directory. Both are looked up on every call.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::resolver::{RuntimeCommand, RuntimeResolver};
use super::runner::Invocation;
use crate::error::EngineError;
use crate::utils::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Content analysis
    Scanner,
    /// Remediation of a flagged file
    Sanitizer,
}

impl EngineKind {
    /// Entry point relative to the resource directory
    pub fn entry_point(&self) -> &'static [&'static str] {
        match self {
            EngineKind::Scanner => &["detect_core", "file_scanner.py"],
            EngineKind::Sanitizer => &["llm_cleaner", "ai_cleaner.py"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Scanner => "scanner",
            EngineKind::Sanitizer => "sanitizer",
        }
    }
}

/// A runnable engine: runtime command plus entry script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    pub runtime: RuntimeCommand,
    pub entry: PathBuf,
}

impl EngineCommand {
    /// Start an invocation with the runtime's fixed args and the entry script
    ///
    /// The child runs from the script's directory.
    pub fn invocation(&self) -> Invocation {
        let invocation = Invocation::new(self.runtime.program.clone())
            .args(self.runtime.fixed_args.iter().cloned())
            .arg(self.entry.to_string_lossy().into_owned());

        match self.entry.parent() {
            Some(dir) => invocation.cwd(dir),
            None => invocation,
        }
    }
}

#[derive(Clone)]
pub struct EngineLocator {
    resolver: Arc<RuntimeResolver>,
    resource_dir: PathBuf,
}

impl EngineLocator {
    pub fn new(resolver: RuntimeResolver, resource_dir: impl Into<PathBuf>) -> Self {
        Self {
            resolver: Arc::new(resolver),
            resource_dir: resource_dir.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(RuntimeResolver::new(config), &config.resource_dir)
    }

    pub fn entry_path(&self, kind: EngineKind) -> PathBuf {
        kind.entry_point()
            .iter()
            .fold(self.resource_dir.clone(), |path, part| path.join(part))
    }

    /// Resolve the runtime, then the entry script
    ///
    /// Runtime probing runs blocking child processes, so it is moved off the
    /// async executor.
    ///
    /// # Errors
    /// `Resolution` if no runtime is usable, `EntryNotFound` if the script is missing
    pub async fn locate(&self, kind: EngineKind) -> Result<EngineCommand, EngineError> {
        let resolver = Arc::clone(&self.resolver);
        let runtime = tokio::task::spawn_blocking(move || resolver.resolve())
            .await
            .map_err(|e| EngineError::Internal(format!("runtime resolution task failed: {}", e)))??;

        let entry = self.entry_path(kind);
        if !entry.is_file() {
            return Err(EngineError::EntryNotFound(entry));
        }

        log::debug!("[engine] {} -> {} {}", kind.as_str(), runtime, entry.display());
        Ok(EngineCommand { runtime, entry })
    }

    pub fn resource_dir(&self) -> &Path {
        &self.resource_dir
    }
}
