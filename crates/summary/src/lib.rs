//! LLM-based session summarization.
//!
//! The server calls this after an upload that asked for a summary. Providers
//! are plain HTTP APIs (Anthropic messages, OpenAI-compatible chat
//! completions); the result is free text.

mod transcript;

pub use transcript::{build_transcript, truncate_str, MAX_TRANSCRIPT_CHARS};

use async_trait::async_trait;
use playback_core::Session;
use std::time::Duration;

pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_SUMMARIZE_MODEL: &str = "PLAYBACK_SUMMARIZE_MODEL";

const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5-20250929";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_TOKENS: u32 = 512;

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("no summarization provider configured (set ANTHROPIC_API_KEY or OPENAI_API_KEY)")]
    Unavailable,
    #[error("{provider} request failed: {source}")]
    Request {
        provider: &'static str,
        source: reqwest::Error,
    },
    #[error("{provider} API error (HTTP {status}): {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("{provider} returned no summary text")]
    EmptyResponse { provider: &'static str },
}

/// Anything that can turn a transcript into a short summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript: &str) -> Result<String, SummaryError>;
}

/// Summarize a whole session through `summarizer`.
pub async fn summarize_session(
    summarizer: &dyn Summarizer,
    session: &Session,
) -> Result<String, SummaryError> {
    let transcript = build_transcript(session);
    summarizer.summarize(&transcript).await
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    Anthropic {
        api_key: String,
        model: String,
        url: String,
    },
    OpenAi {
        api_key: String,
        model: String,
        base_url: String,
    },
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Anthropic { .. } => "Anthropic",
            Provider::OpenAi { .. } => "OpenAI",
        }
    }

    /// Pick a provider from the environment, preferring Anthropic.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let model = non_empty(ENV_SUMMARIZE_MODEL);

        if let Some(api_key) = non_empty(ENV_ANTHROPIC_API_KEY) {
            return Some(Provider::Anthropic {
                api_key,
                model: model.unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
                url: ANTHROPIC_URL.to_string(),
            });
        }
        if let Some(api_key) = non_empty(ENV_OPENAI_API_KEY) {
            let base_url = non_empty(ENV_OPENAI_BASE_URL)
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
            return Some(Provider::OpenAi {
                api_key,
                model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                base_url: base_url.trim_end_matches('/').to_string(),
            });
        }
        None
    }
}

/// [`Summarizer`] backed by a hosted LLM API.
#[derive(Debug, Clone)]
pub struct LlmSummarizer {
    client: reqwest::Client,
    provider: Provider,
}

impl LlmSummarizer {
    pub fn new(provider: Provider) -> Result<Self, SummaryError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| SummaryError::Request {
                provider: provider.name(),
                source,
            })?;
        Ok(Self { client, provider })
    }

    /// Build from environment variables; `Unavailable` when no key is set.
    pub fn from_env() -> Result<Self, SummaryError> {
        let provider = Provider::from_env().ok_or(SummaryError::Unavailable)?;
        Self::new(provider)
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    async fn call_anthropic(
        &self,
        api_key: &str,
        model: &str,
        url: &str,
        prompt: &str,
    ) -> Result<String, SummaryError> {
        let provider = self.provider.name();
        let request_body = serde_json::json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "messages": [{"role": "user", "content": prompt}]
        });
        let resp = self
            .client
            .post(url)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request_body)
            .send()
            .await
            .map_err(|source| SummaryError::Request { provider, source })?;
        let body = read_json(provider, resp).await?;
        Ok(anthropic_text(&body).to_string())
    }

    async fn call_openai(
        &self,
        api_key: &str,
        model: &str,
        base_url: &str,
        prompt: &str,
    ) -> Result<String, SummaryError> {
        let provider = self.provider.name();
        let request_body = serde_json::json!({
            "model": model,
            "max_tokens": MAX_TOKENS,
            "messages": [{"role": "user", "content": prompt}]
        });
        let resp = self
            .client
            .post(format!("{base_url}/chat/completions"))
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|source| SummaryError::Request { provider, source })?;
        let body = read_json(provider, resp).await?;
        Ok(openai_text(&body).to_string())
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, transcript: &str) -> Result<String, SummaryError> {
        let prompt = build_prompt(transcript);
        tracing::debug!(
            provider = self.provider.name(),
            transcript_chars = transcript.chars().count(),
            "requesting session summary"
        );
        let text = match &self.provider {
            Provider::Anthropic {
                api_key,
                model,
                url,
            } => self.call_anthropic(api_key, model, url, &prompt).await?,
            Provider::OpenAi {
                api_key,
                model,
                base_url,
            } => self.call_openai(api_key, model, base_url, &prompt).await?,
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(SummaryError::EmptyResponse {
                provider: self.provider.name(),
            });
        }
        Ok(text.to_string())
    }
}

async fn read_json(
    provider: &'static str,
    resp: reqwest::Response,
) -> Result<serde_json::Value, SummaryError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SummaryError::Status {
            provider,
            status: status.as_u16(),
            body,
        });
    }
    resp.json()
        .await
        .map_err(|source| SummaryError::Request { provider, source })
}

fn build_prompt(transcript: &str) -> String {
    format!(
        "Summarize this AI coding session in two or three sentences. \
        Focus on what the user asked for and what the agent changed.\n\
        \n\
        <transcript>\n\
        {transcript}\n\
        </transcript>"
    )
}

fn anthropic_text(body: &serde_json::Value) -> &str {
    body.get("content")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|block| block.get("text"))
        .and_then(|t| t.as_str())
        .unwrap_or("")
}

fn openai_text(body: &serde_json::Value) -> &str {
    body.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|t| t.as_str())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_no_keys_means_no_provider() {
        assert_eq!(Provider::from_lookup(|_| None), None);
        assert_eq!(
            Provider::from_lookup(lookup_from(&[(ENV_OPENAI_API_KEY, "  ")])),
            None
        );
    }

    #[test]
    fn test_anthropic_preferred() {
        let provider = Provider::from_lookup(lookup_from(&[
            (ENV_ANTHROPIC_API_KEY, "ak"),
            (ENV_OPENAI_API_KEY, "ok"),
        ]))
        .unwrap();
        assert_eq!(provider.name(), "Anthropic");
    }

    #[test]
    fn test_openai_base_url_and_model_override() {
        let provider = Provider::from_lookup(lookup_from(&[
            (ENV_OPENAI_API_KEY, "ok"),
            (ENV_OPENAI_BASE_URL, "http://localhost:11434/v1/"),
            (ENV_SUMMARIZE_MODEL, "llama3"),
        ]))
        .unwrap();
        assert_eq!(
            provider,
            Provider::OpenAi {
                api_key: "ok".to_string(),
                model: "llama3".to_string(),
                base_url: "http://localhost:11434/v1".to_string(),
            }
        );
    }

    #[test]
    fn test_response_text_extraction() {
        let anthropic = serde_json::json!({"content": [{"type": "text", "text": "A summary"}]});
        assert_eq!(anthropic_text(&anthropic), "A summary");
        let openai = serde_json::json!({"choices": [{"message": {"content": "B summary"}}]});
        assert_eq!(openai_text(&openai), "B summary");
        assert_eq!(openai_text(&serde_json::json!({})), "");
    }

    #[test]
    fn test_prompt_embeds_transcript() {
        let prompt = build_prompt("Step 1\nUser: hi");
        assert!(prompt.contains("<transcript>\nStep 1\nUser: hi\n</transcript>"));
    }
}
