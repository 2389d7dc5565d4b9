use playback_core::{Session, ToolStatus};

/// Upper bound on transcript size sent to a provider.
pub const MAX_TRANSCRIPT_CHARS: usize = 50_000;

const FIELD_LIMIT: usize = 500;

/// Render a session as a plain-text transcript, one block per step.
pub fn build_transcript(session: &Session) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut total_chars = 0;

    for (index, step) in session.steps.iter().enumerate() {
        if total_chars >= MAX_TRANSCRIPT_CHARS {
            parts.push("... (truncated)".to_string());
            break;
        }

        let mut lines = vec![format!("Step {}", index + 1)];
        if !step.user_text.is_empty() {
            lines.push(format!("User: {}", truncate_str(&step.user_text, FIELD_LIMIT)));
        }
        if !step.agent_summary.is_empty() {
            lines.push(format!(
                "Agent: {}",
                truncate_str(&step.agent_summary, FIELD_LIMIT)
            ));
        }
        if !step.reasoning_summary.is_empty() {
            lines.push(format!(
                "Reasoning: {}",
                truncate_str(&step.reasoning_summary, FIELD_LIMIT)
            ));
        }
        if !step.tools.is_empty() {
            let tools: Vec<String> = step
                .tools
                .iter()
                .map(|tool| {
                    let status = match tool.status {
                        ToolStatus::Pending => "pending",
                        ToolStatus::Ok => "ok",
                    };
                    let name = if tool.name.is_empty() { "(tool)" } else { &tool.name };
                    format!("{name} [{status}]")
                })
                .collect();
            lines.push(format!("Tools: {}", tools.join(", ")));
        }
        if !step.agent_output.is_empty() {
            lines.push(format!(
                "Output: {}",
                truncate_str(&step.agent_output, FIELD_LIMIT)
            ));
        }

        let block = lines.join("\n");
        total_chars += block.len() + 2;
        parts.push(block);
    }

    parts.join("\n\n")
}

/// Cut `s` to at most `max_len` bytes, ending in `...` when shortened.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let mut end = max_len.saturating_sub(3);
        // Don't split in the middle of a multi-byte char
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}
