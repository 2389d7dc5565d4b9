use anyhow::{Context, Result};
use playback_core::Session;
use std::path::Path;

use crate::transform::transform;

/// How raw input should be interpreted. Chosen by the caller, never sniffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// A session document already in playback shape (`.json`)
    Document,
    /// A newline-delimited rollout event stream (`.jsonl` and anything else)
    EventStream,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Self {
        if path.extension().is_some_and(|ext| ext == "json") {
            InputFormat::Document
        } else {
            InputFormat::EventStream
        }
    }
}

/// Turn raw text into a session. Documents pass through unchanged; event
/// streams are reduced into steps. Only an invalid document is an error.
pub fn ingest(raw: &str, format: InputFormat) -> Result<Session> {
    match format {
        InputFormat::Document => {
            serde_json::from_str(raw).context("Failed to parse session document")
        }
        InputFormat::EventStream => Ok(transform(raw)),
    }
}

/// Read and ingest a file, picking the format from its extension.
pub fn ingest_file(path: &Path) -> Result<Session> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let format = InputFormat::from_path(path);
    tracing::debug!(path = %path.display(), ?format, "ingesting session file");
    ingest(&raw, format).with_context(|| format!("Failed to ingest {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a/session.json")), InputFormat::Document);
        assert_eq!(InputFormat::from_path(Path::new("rollout.jsonl")), InputFormat::EventStream);
        assert_eq!(InputFormat::from_path(Path::new("notes.txt")), InputFormat::EventStream);
        assert_eq!(InputFormat::from_path(Path::new("noext")), InputFormat::EventStream);
    }

    #[test]
    fn test_document_is_identity() {
        let raw = r#"{"title":"Mine","createdAt":"2026-01-01T00:00:00.000Z","steps":[{"id":"t1","user_text":"hi","agent_summary":"","reasoning_summary":"","agent_output":"","tools":[]}],"meta":{"k":"v"}}"#;
        let session = ingest(raw, InputFormat::Document).unwrap();
        assert_eq!(session.title, "Mine");
        assert_eq!(session.created_at, "2026-01-01T00:00:00.000Z");
        assert_eq!(session.steps[0].reasoning_summary, "");
        assert_eq!(session.meta["k"], "v");
    }

    #[test]
    fn test_document_keeps_step_annotations() {
        let raw = r#"{"steps":[{"id":"t1","user_text":"hi","summary":"per-step note"}]}"#;
        let session = ingest(raw, InputFormat::Document).unwrap();
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["steps"][0]["summary"], "per-step note");
    }

    #[test]
    fn test_document_with_null_title() {
        let session = ingest(r#"{"title":null,"steps":[]}"#, InputFormat::Document).unwrap();
        assert_eq!(session.title, "Playback");
        assert!(session.steps.is_empty());
    }

    #[test]
    fn test_document_is_not_reduced() {
        let raw = r#"{"type":"event_msg","payload":{"type":"user_message","message":"hi"}}"#;
        assert!(ingest(raw, InputFormat::Document).is_err());
        assert_eq!(ingest(raw, InputFormat::EventStream).unwrap().steps.len(), 1);
    }

    #[test]
    fn test_event_stream_never_fails() {
        let session = ingest("garbage\n{}\n", InputFormat::EventStream).unwrap();
        assert!(session.steps.is_empty());
    }
}
