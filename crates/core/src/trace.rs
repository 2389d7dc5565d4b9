use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_TITLE: &str = "Playback";

pub type Meta = serde_json::Map<String, serde_json::Value>;

/// A reconstructed agent session, the unit of storage and playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Store-assigned identifier, absent until the session is stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// `null` or empty becomes [`DEFAULT_TITLE`]
    #[serde(default = "default_title", deserialize_with = "title_or_default")]
    pub title: String,
    /// ISO-8601 creation time; `null` or empty becomes the current time
    #[serde(
        rename = "createdAt",
        default = "now_iso8601",
        deserialize_with = "created_at_or_now"
    )]
    pub created_at: String,
    pub steps: Vec<Step>,
    /// Auxiliary annotations (e.g. an attached summary)
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: Meta,
    /// Unrecognized top-level fields, kept so documents round-trip unchanged
    #[serde(flatten)]
    pub extra: Meta,
}

impl Session {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            id: None,
            title: default_title(),
            created_at: now_iso8601(),
            steps,
            meta: Meta::new(),
            extra: Meta::new(),
        }
    }

    pub fn tool_call_count(&self) -> usize {
        self.steps.iter().map(|step| step.tools.len()).sum()
    }
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn title_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(default_title))
}

fn created_at_or_now<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|ts| !ts.trim().is_empty())
        .unwrap_or_else(now_iso8601))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Current time in the `2026-01-02T03:04:05.678Z` form.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// One user turn: the prompt plus everything the agent did until the next prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Step {
    /// `t1`, `t2`, ... in creation order
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub user_text: String,
    pub agent_summary: String,
    pub reasoning_summary: String,
    pub agent_output: String,
    pub tools: Vec<ToolCall>,
    /// Per-step annotations this model does not know about
    #[serde(flatten)]
    pub extra: Meta,
}

impl Step {
    pub fn new(ordinal: usize, timestamp: Option<String>, user_text: impl Into<String>) -> Self {
        Self {
            id: step_id(ordinal),
            timestamp,
            user_text: user_text.into(),
            ..Self::default()
        }
    }
}

/// Step identifier for a 1-based ordinal.
pub fn step_id(ordinal: usize) -> String {
    format!("t{ordinal}")
}

/// A single tool invocation observed within a step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCall {
    pub name: String,
    pub arguments: String,
    pub call_id: String,
    pub output: String,
    pub status: ToolStatus,
}

impl ToolCall {
    pub fn pending(
        name: impl Into<String>,
        arguments: impl Into<String>,
        call_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
            call_id: call_id.into(),
            output: String::new(),
            status: ToolStatus::Pending,
        }
    }

    /// Attach a result. There is no error status: any result marks the call ok.
    pub fn resolve(&mut self, output: impl Into<String>) {
        self.output = output.into();
        self.status = ToolStatus::Ok;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    #[default]
    Pending,
    Ok,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_document_shape() {
        let mut step = Step::new(1, Some("2026-02-03T04:11:00.097Z".to_string()), "fix bug");
        step.tools.push(ToolCall::pending("grep", "{}", "c1"));
        let session = Session::new(vec![step]);

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["title"], "Playback");
        assert!(value["createdAt"].as_str().unwrap().ends_with('Z'));
        assert!(value.get("id").is_none());
        assert_eq!(value["steps"][0]["id"], "t1");
        assert_eq!(value["steps"][0]["user_text"], "fix bug");
        assert_eq!(value["steps"][0]["tools"][0]["status"], "pending");
        assert_eq!(value["meta"], serde_json::json!({}));
    }

    #[test]
    fn test_lenient_document_defaults() {
        let json = r#"{"steps":[{"user_text":"hi","tools":[{"name":"ls"}]}]}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.title, DEFAULT_TITLE);
        assert!(!session.created_at.is_empty());
        assert!(session.meta.is_empty());
        assert_eq!(session.steps[0].user_text, "hi");
        assert_eq!(session.steps[0].timestamp, None);
        assert_eq!(session.steps[0].tools[0].status, ToolStatus::Pending);
        assert_eq!(session.tool_call_count(), 1);
    }

    #[test]
    fn test_null_fields_take_defaults() {
        let json = r#"{"title":null,"createdAt":null,"meta":null,"steps":[]}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.title, DEFAULT_TITLE);
        assert!(session.created_at.ends_with('Z'));
        assert!(session.meta.is_empty());

        let session: Session = serde_json::from_str(r#"{"title":"  ","steps":[]}"#).unwrap();
        assert_eq!(session.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let document = serde_json::json!({
            "title": "Shared",
            "createdAt": "2026-02-03T04:11:00.000Z",
            "source": "codex",
            "steps": [{
                "id": "t1",
                "user_text": "hi",
                "agent_summary": "",
                "reasoning_summary": "",
                "agent_output": "",
                "tools": [],
                "summary": "per-step note"
            }],
            "meta": {}
        });
        let session: Session = serde_json::from_value(document.clone()).unwrap();
        assert_eq!(session.extra["source"], "codex");
        assert_eq!(session.steps[0].extra["summary"], "per-step note");
        assert_eq!(serde_json::to_value(&session).unwrap(), document);
    }

    #[test]
    fn test_missing_steps_is_rejected() {
        let result = serde_json::from_str::<Session>(r#"{"title":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_marks_ok() {
        let mut call = ToolCall::pending("grep", "", "c1");
        call.resolve("3 matches");
        assert_eq!(call.status, ToolStatus::Ok);
        assert_eq!(call.output, "3 matches");
        assert_eq!(serde_json::to_value(call.status).unwrap(), "ok");
    }
}
