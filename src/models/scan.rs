use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::detection::{normalize_detections, Detection};

/// One uploaded file, not yet persisted anywhere
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanRequestItem {
    pub name: String,
    #[serde(default)]
    pub bytes: Vec<u8>,
}

impl ScanRequestItem {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Outcome of scanning a single file
///
/// Exactly one per requested item. When `error` is set the engine run failed
/// and `detections` is empty.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub filename: String,
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub has_detection: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Set when the engine exited cleanly but its output had to be discarded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl ScanResult {
    pub fn new(filename: impl Into<String>, detections: Vec<Detection>) -> Self {
        Self {
            filename: filename.into(),
            has_detection: !detections.is_empty(),
            detections,
            error: None,
            diagnostic: None,
        }
    }

    /// Result for an item whose engine invocation failed
    pub fn failed(filename: impl Into<String>, error: impl ToString) -> Self {
        Self {
            filename: filename.into(),
            detections: Vec::new(),
            has_detection: false,
            error: Some(error.to_string()),
            diagnostic: None,
        }
    }

    /// Build a result from one engine result object
    ///
    /// The engine reports under the original filename it was handed; when it
    /// doesn't, `fallback_name` is used. An `error` string reported by the
    /// engine itself (e.g. an unsupported extension) wins over any detections.
    pub fn from_engine(payload: &Value, fallback_name: &str) -> Self {
        let filename = payload
            .get("filename")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback_name);

        let engine_error = payload
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty());

        match engine_error {
            Some(err) => Self::failed(filename, err),
            None => Self::new(filename, normalize_detections(payload)),
        }
    }

    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
