use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys the scan engine may use for the finding's category
const TYPE_KEYS: [&str; 3] = ["type", "category", "attack"];
const KEYWORD_KEYS: [&str; 3] = ["keyword", "key", "match"];
const SUMMARY_KEYS: [&str; 5] = ["summary", "message", "desc", "description", "intent"];

/// Containers an engine object may wrap its detection list in
const LIST_KEYS: [&str; 3] = ["detections", "result", "data"];

/// A normalized finding reported by the scan engine for one file
///
/// Every field is always present once normalized: engines that omit the
/// category get `"unknown"`, engines that omit a summary get `""`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Detection {
    #[serde(default)]
    pub id: i64,
    #[serde(rename = "type", default = "unknown_type")]
    pub kind: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub summary: String,
}

fn unknown_type() -> String {
    "unknown".to_string()
}

impl Detection {
    /// Normalize one raw engine item
    ///
    /// # Arguments
    /// * `position` - 1-based position in the engine's list, used when the item has no id
    /// * `raw` - The item exactly as the engine printed it
    pub fn from_engine(position: usize, raw: &Value) -> Self {
        let fields = match raw {
            Value::Object(map) => map.clone(),
            // Bare strings and numbers are treated as a keyword hit
            other => {
                let mut map = Map::new();
                map.insert("keyword".to_string(), Value::String(display_value(other)));
                map
            }
        };

        Self {
            id: fields
                .get("id")
                .and_then(parse_id)
                .unwrap_or(position as i64),
            kind: first_text(&fields, &TYPE_KEYS).unwrap_or_else(unknown_type),
            keyword: first_text(&fields, &KEYWORD_KEYS).unwrap_or_default(),
            summary: first_text(&fields, &SUMMARY_KEYS).unwrap_or_default(),
        }
    }
}

/// Normalize an engine payload into a detection list
///
/// Accepts either a bare list of detections or an object holding the list
/// under one of the known container keys. Anything else yields no detections.
pub fn normalize_detections(payload: &Value) -> Vec<Detection> {
    let items: &[Value] = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => LIST_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|v| is_truthy(v))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, raw)| Detection::from_engine(idx + 1, raw))
        .collect()
}

/// First alias holding a usable value; empty strings and nulls fall through
fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .find(|v| is_truthy(v))
        .map(display_value)
}

fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
