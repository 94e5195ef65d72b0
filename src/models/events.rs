use serde::{Deserialize, Serialize};

use super::scan::ScanResult;

/// Payload of `scan-progress`, emitted once per finished item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Payload of `scan-result`, keyed by the filename the engine reported
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultEvent {
    pub name: String,
    pub result: ScanResult,
}

/// Payload of `scan-complete`, emitted exactly once per batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionEvent {
    pub total: usize,
    pub results: Vec<ScanResult>,
}
