//! Environment variable management
//!
//! Handles loading of `.env` and the host configuration derived from it.

use anyhow::{anyhow, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const RESOURCE_DIR_VAR: &str = "TEXNEL_RESOURCE_DIR";
pub const ENGINE_TIMEOUT_VAR: &str = "TEXNEL_ENGINE_TIMEOUT_SECS";
pub const ENGINE_VERBOSE_VAR: &str = "TEXNEL_ENGINE_VERBOSE";

/// Runtime override read first, then the secondary one
pub const PRIMARY_RUNTIME_VAR: &str = "DETECT_PYTHON";
pub const SECONDARY_RUNTIME_VAR: &str = "PYTHON";

/// Prefix of every staged temp file
pub const STAGING_PREFIX: &str = "texnel";

/// Load environment variables from .env file
///
/// Uses dotenv crate to load variables from .env file in project root.
/// Does not fail if .env file doesn't exist (optional configuration).
pub fn load_env() -> Result<()> {
    dotenv::dotenv().ok();
    Ok(())
}

/// Host configuration, built once at startup
///
/// The runtime override variables are stored by name only; the resolver
/// reads their values on every call.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root holding the bundled runtime and engine entry points
    pub resource_dir: PathBuf,
    /// Where uploaded buffers are staged
    pub staging_dir: PathBuf,
    pub primary_runtime_var: String,
    pub secondary_runtime_var: String,
    /// Upper bound for one engine run; `None` waits indefinitely
    pub engine_timeout: Option<Duration>,
    /// Ask the scan engine for verbose logging on stderr
    pub engine_verbose: bool,
}

impl AppConfig {
    /// Defaults for a given resource directory, without consulting the environment
    pub fn new(resource_dir: impl Into<PathBuf>) -> Self {
        Self {
            resource_dir: resource_dir.into(),
            staging_dir: env::temp_dir(),
            primary_runtime_var: PRIMARY_RUNTIME_VAR.to_string(),
            secondary_runtime_var: SECONDARY_RUNTIME_VAR.to_string(),
            engine_timeout: None,
            engine_verbose: true,
        }
    }

    /// Build the configuration from the process environment
    ///
    /// # Arguments
    /// * `default_resource_dir` - Used when `TEXNEL_RESOURCE_DIR` is not set
    ///
    /// # Errors
    /// Returns error if `TEXNEL_RESOURCE_DIR` names something that is not a directory
    pub fn from_env(default_resource_dir: &Path) -> Result<Self> {
        load_env()?;

        let resource_dir = match env::var(RESOURCE_DIR_VAR) {
            Ok(dir) if !dir.trim().is_empty() => {
                let dir = PathBuf::from(dir.trim());
                if !dir.is_dir() {
                    return Err(anyhow!(
                        "{} is set but is not a directory: {}",
                        RESOURCE_DIR_VAR,
                        dir.display()
                    ));
                }
                dir
            }
            _ => default_resource_dir.to_path_buf(),
        };

        let mut config = Self::new(resource_dir);
        config.engine_timeout = env::var(ENGINE_TIMEOUT_VAR)
            .ok()
            .and_then(|raw| parse_timeout(&raw));
        config.engine_verbose = env::var(ENGINE_VERBOSE_VAR)
            .map(|raw| parse_flag(&raw))
            .unwrap_or(true);

        Ok(config)
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.engine_timeout = timeout;
        self
    }
}

/// Parse a timeout in whole seconds; zero and garbage mean "no timeout"
fn parse_timeout(raw: &str) -> Option<Duration> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "off" | "no"
    )
}

/// Development fallback for the resource directory
pub fn dev_resource_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources")
}
