use crate::{Session, Step, ToolCall};

/// Step with the given ordinal and prompt, no timestamp.
pub fn step(ordinal: usize, user_text: &str) -> Step {
    Step::new(ordinal, None, user_text)
}

/// Resolved tool call.
pub fn tool_ok(name: &str, call_id: &str, output: &str) -> ToolCall {
    let mut call = ToolCall::pending(name, "{}", call_id);
    call.resolve(output);
    call
}

/// Session with `count` steps whose prompts are `prompt 1`, `prompt 2`, ...
pub fn session(count: usize) -> Session {
    let steps = (1..=count)
        .map(|ordinal| step(ordinal, &format!("prompt {ordinal}")))
        .collect();
    Session::new(steps)
}

/// Session titled `title` with a single step.
pub fn titled(title: &str) -> Session {
    let mut session = session(1);
    session.title = title.to_string();
    session
}
