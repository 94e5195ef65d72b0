use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::detection::Detection;

/// A remediation request for one previously scanned file
///
/// `detections` is exactly the list the UI is displaying. The host never
/// recomputes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeRequest {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub src_path: Option<String>,
    #[serde(default)]
    pub bytes: Option<Vec<u8>>,
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(default)]
    pub ai_disabled: bool,
}

impl SanitizeRequest {
    /// Caller-supplied path, if it is non-blank
    pub fn persisted_path(&self) -> Option<&str> {
        self.src_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn mask_token(&self) -> Option<&str> {
        self.mask.as_deref().filter(|m| !m.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patched: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SanitizeResult {
    pub fn failure(error: impl ToString) -> Self {
        Self {
            ok: false,
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn success(output_path: String, patched: bool, report: Option<Value>) -> Self {
        Self {
            ok: true,
            output_path: Some(output_path),
            patched: Some(patched),
            report,
            error: None,
        }
    }
}
