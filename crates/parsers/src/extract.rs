//! Text extraction helpers for loosely-shaped payload fields.

use serde_json::Value;

/// Flatten a message `content` field into plain text.
///
/// A string is taken verbatim. An array contributes each element in order: a
/// string element is itself, an object element is its `text` field, else its
/// `output_text` field, else nothing. Any other shape yields an empty string.
pub fn extract_content_text(content: &Value) -> String {
    match content {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(content_item_text).collect(),
        _ => String::new(),
    }
}

fn content_item_text(item: &Value) -> &str {
    match item {
        Value::String(text) => text,
        Value::Object(obj) => obj
            .get("text")
            .and_then(Value::as_str)
            .or_else(|| obj.get("output_text").and_then(Value::as_str))
            .unwrap_or(""),
        _ => "",
    }
}

/// Read the digest out of a reasoning payload's `summary` field.
///
/// A string summary is used as-is. For an array, the first entry with a
/// non-empty `summary_text` (or, failing that, `text`) wins.
pub fn extract_reasoning_summary(payload: &Value) -> String {
    match payload.get("summary") {
        Some(Value::String(summary)) => summary.clone(),
        Some(Value::Array(entries)) => entries
            .iter()
            .find_map(|entry| {
                let text = entry
                    .get("summary_text")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .or_else(|| entry.get("text").and_then(Value::as_str))?;
                (!text.is_empty()).then(|| text.to_string())
            })
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Render a scalar-ish payload field as text; non-string JSON is kept as compact JSON.
pub(crate) fn value_as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
