//! Raw rollout lines and their classification into typed events.
//!
//! A rollout line looks like
//! `{"timestamp":"...","type":"response_item","payload":{"type":"function_call",...}}`.
//! The outer `type` and the nested `payload.type` together decide what the line
//! means; everything else is read leniently from the payload.

use serde::Deserialize;
use serde_json::Value;

use crate::extract::{extract_content_text, extract_reasoning_summary, value_as_text};

/// Envelope fields stay untyped so an odd `timestamp` or `type` never costs the
/// whole line.
#[derive(Debug, Deserialize)]
pub(crate) struct RawLine {
    #[serde(default)]
    timestamp: Value,
    #[serde(rename = "type", default)]
    entry_type: Value,
    #[serde(default)]
    payload: Value,
}

/// A recognized rollout event.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    /// `event_msg` / `user_message`: opens a new step
    UserMessage {
        timestamp: Option<String>,
        text: String,
    },
    /// `event_msg` / `agent_message`
    AgentMessage { message: String },
    /// `response_item` / `message`
    Message { text: String },
    /// `response_item` / `reasoning`
    Reasoning { summary: String },
    /// `response_item` / `function_call`
    FunctionCall {
        name: String,
        arguments: String,
        call_id: String,
    },
    /// `response_item` / `function_call_output`
    FunctionCallOutput { call_id: String, output: String },
    Unrecognized,
}

impl RawEvent {
    /// Parse and classify a single line. `None` means the line is not valid JSON.
    pub fn parse_line(line: &str) -> Option<Self> {
        let raw: RawLine = serde_json::from_str(line).ok()?;
        Some(Self::classify(raw))
    }

    pub(crate) fn classify(raw: RawLine) -> Self {
        let payload = &raw.payload;
        let payload_type = str_field(payload, "type").unwrap_or("");

        match (raw.entry_type.as_str().unwrap_or(""), payload_type) {
            ("event_msg", "user_message") => RawEvent::UserMessage {
                timestamp: timestamp_text(&raw.timestamp)
                    .or_else(|| payload.get("timestamp").and_then(timestamp_text)),
                text: non_empty_str(payload, "message")
                    .or_else(|| non_empty_str(payload, "text"))
                    .unwrap_or("")
                    .to_string(),
            },
            ("event_msg", "agent_message") => RawEvent::AgentMessage {
                message: str_field(payload, "message").unwrap_or("").to_string(),
            },
            ("response_item", "message") => {
                let content = match payload.get("content") {
                    None | Some(Value::Null) => payload.get("text"),
                    Some(Value::String(s)) if s.is_empty() => payload.get("text"),
                    Some(content) => Some(content),
                };
                RawEvent::Message {
                    text: content.map(extract_content_text).unwrap_or_default(),
                }
            }
            ("response_item", "reasoning") => RawEvent::Reasoning {
                summary: extract_reasoning_summary(payload),
            },
            ("response_item", "function_call") => RawEvent::FunctionCall {
                name: str_field(payload, "name").unwrap_or("").to_string(),
                arguments: payload.get("arguments").map(value_as_text).unwrap_or_default(),
                call_id: str_field(payload, "call_id").unwrap_or("").to_string(),
            },
            ("response_item", "function_call_output") => RawEvent::FunctionCallOutput {
                call_id: str_field(payload, "call_id").unwrap_or("").to_string(),
                output: payload.get("output").map(value_as_text).unwrap_or_default(),
            },
            _ => RawEvent::Unrecognized,
        }
    }
}

/// Timestamps are carried verbatim: a non-empty string as-is, a number as its
/// JSON text.
fn timestamp_text(value: &Value) -> Option<String> {
    match value {
        Value::String(ts) if !ts.is_empty() => Some(ts.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    str_field(value, key).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_outer_timestamp() {
        let line = r#"{"timestamp":"2026-02-03T04:11:00.097Z","type":"event_msg","payload":{"type":"user_message","message":"hello","timestamp":"inner"}}"#;
        assert_eq!(
            RawEvent::parse_line(line),
            Some(RawEvent::UserMessage {
                timestamp: Some("2026-02-03T04:11:00.097Z".to_string()),
                text: "hello".to_string(),
            })
        );
    }

    #[test]
    fn test_user_message_falls_back_to_payload_fields() {
        let line = r#"{"type":"event_msg","payload":{"type":"user_message","text":"from text","timestamp":"inner"}}"#;
        assert_eq!(
            RawEvent::parse_line(line),
            Some(RawEvent::UserMessage {
                timestamp: Some("inner".to_string()),
                text: "from text".to_string(),
            })
        );
    }

    #[test]
    fn test_message_falls_back_to_text_field() {
        let line = r#"{"type":"response_item","payload":{"type":"message","text":"plain"}}"#;
        assert_eq!(
            RawEvent::parse_line(line),
            Some(RawEvent::Message {
                text: "plain".to_string()
            })
        );
    }

    #[test]
    fn test_function_call_with_object_arguments() {
        let line = r#"{"type":"response_item","payload":{"type":"function_call","name":"shell","arguments":{"cmd":"ls"},"call_id":"c9"}}"#;
        assert_eq!(
            RawEvent::parse_line(line),
            Some(RawEvent::FunctionCall {
                name: "shell".to_string(),
                arguments: r#"{"cmd":"ls"}"#.to_string(),
                call_id: "c9".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_kinds_are_unrecognized() {
        for line in [
            r#"{"type":"session_meta","payload":{"id":"abc"}}"#,
            r#"{"type":"event_msg","payload":{"type":"token_count"}}"#,
            r#"{"type":"response_item"}"#,
            r#"{}"#,
        ] {
            assert_eq!(RawEvent::parse_line(line), Some(RawEvent::Unrecognized), "{line}");
        }
    }

    #[test]
    fn test_numeric_timestamp_is_carried_as_text() {
        let line = r#"{"timestamp":1738555860,"type":"event_msg","payload":{"type":"user_message","message":"fix bug"}}"#;
        assert_eq!(
            RawEvent::parse_line(line),
            Some(RawEvent::UserMessage {
                timestamp: Some("1738555860".to_string()),
                text: "fix bug".to_string(),
            })
        );
    }

    #[test]
    fn test_odd_envelope_types_do_not_reject_the_line() {
        let line = r#"{"timestamp":{"secs":1},"type":"event_msg","payload":{"type":"agent_message","message":"ok","timestamp":7}}"#;
        assert_eq!(
            RawEvent::parse_line(line),
            Some(RawEvent::AgentMessage {
                message: "ok".to_string()
            })
        );
        let line = r#"{"timestamp":null,"type":42,"payload":{"type":"user_message","message":"x"}}"#;
        assert_eq!(RawEvent::parse_line(line), Some(RawEvent::Unrecognized));
    }

    #[test]
    fn test_invalid_json_is_none() {
        assert_eq!(RawEvent::parse_line("{not json"), None);
    }
}
