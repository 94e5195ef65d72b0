//! Error types for engine orchestration
//!
//! Per-item failures inside a scan batch are converted to data
//! (`ScanResult.error`) by the orchestrator; these types only describe what
//! went wrong.

use std::path::PathBuf;
use std::time::Duration;

/// Longest stderr excerpt carried inside a [`EngineError::Process`]
pub const STDERR_EXCERPT_LIMIT: usize = 300;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No usable runtime for the external engines
    #[error("Python executable not found. Set {primary_var} to the full path of the interpreter (or {secondary_var})")]
    Resolution {
        primary_var: String,
        secondary_var: String,
    },

    /// The runtime resolved but the engine entry point is missing
    #[error("engine entry point not found: {}", .0.display())]
    EntryNotFound(PathBuf),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Engine exited with a non-zero status
    #[error("engine rc={} {stderr}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    Process { code: Option<i32>, stderr: String },

    #[error("engine did not finish within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("engine output is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("staging failed for {name}: {source}")]
    Staging {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Validation(String),

    /// Engine exited cleanly but its output lacks a required field
    #[error("engine output is missing {0}")]
    IncompleteOutput(&'static str),

    #[error("{0}")]
    Internal(String),
}

impl EngineError {
    pub fn process(code: Option<i32>, stderr: &str) -> Self {
        EngineError::Process {
            code,
            stderr: excerpt(stderr, STDERR_EXCERPT_LIMIT),
        }
    }
}

/// First `limit` characters of `text`, cut on a char boundary
pub fn excerpt(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Errors raised at the UI/host boundary
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Invalid IPC channel: {0}")]
    UnknownChannel(String),

    #[error("invalid payload for {channel}: {reason}")]
    InvalidPayload { channel: String, reason: String },

    #[error("{0}")]
    Host(String),
}
