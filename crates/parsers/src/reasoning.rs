use playback_core::Step;

const PROMPT_PREVIEW_LIMIT: usize = 80;
const PROMPT_PREVIEW_KEEP: usize = 77;

/// Build a reasoning digest for a step that never carried one.
///
/// Precedence: tools used (plus the agent reply), then the agent reply alone,
/// then a quote of the prompt. Returns an empty string when the step has none
/// of these; any other result ends with a single period.
pub fn synthesize_reasoning(step: &Step) -> String {
    let mut parts: Vec<String> = Vec::new();

    let mut tool_names: Vec<&str> = Vec::new();
    for tool in &step.tools {
        if !tool.name.is_empty() && !tool_names.contains(&tool.name.as_str()) {
            tool_names.push(&tool.name);
        }
    }
    if !tool_names.is_empty() {
        parts.push(format!("Used tools: {}", tool_names.join(", ")));
    }

    if !step.agent_summary.is_empty() {
        let summary = step
            .agent_summary
            .strip_suffix('.')
            .unwrap_or(&step.agent_summary);
        parts.push(summary.to_string());
    }

    if parts.is_empty() && !step.user_text.is_empty() {
        parts.push(format!(
            "Responded to: \"{}\"",
            preview(&step.user_text)
        ));
    }

    if parts.is_empty() {
        return String::new();
    }
    format!("{}.", parts.join(". "))
}

fn preview(text: &str) -> String {
    if text.chars().count() > PROMPT_PREVIEW_LIMIT {
        let kept: String = text.chars().take(PROMPT_PREVIEW_KEEP).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}
