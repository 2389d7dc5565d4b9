//! Rollout-to-steps reduction.
//!
//! Events are folded in input order. A `user_message` closes the open step and
//! opens the next one; every other event mutates the open step or is dropped
//! when there is none.

use playback_core::{Session, Step, ToolCall};
use std::collections::HashMap;

use crate::event::RawEvent;
use crate::reasoning::synthesize_reasoning;

/// Transform rollout text into a session. Never fails: unparseable or
/// unrecognized lines are skipped.
pub fn transform(raw: &str) -> Session {
    let mut reducer = StepReducer::new();
    for line in raw.lines() {
        reducer.push_line(line);
    }
    Session::new(reducer.finish())
}

/// Where a registered tool call lives: step ordinal and index within its tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ToolSlot {
    step: usize,
    tool: usize,
}

/// Stateful fold over rollout events.
#[derive(Debug, Default)]
pub struct StepReducer {
    closed: Vec<Step>,
    current: Option<Step>,
    /// call_id -> slot, kept for the whole session. First registration wins.
    call_index: HashMap<String, ToolSlot>,
    skipped_lines: usize,
}

impl StepReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw line. Blank lines are ignored, malformed ones counted and skipped.
    pub fn push_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        match RawEvent::parse_line(line) {
            Some(event) => self.apply(event),
            None => {
                self.skipped_lines += 1;
                tracing::trace!("skipping unparseable rollout line");
            }
        }
    }

    pub fn apply(&mut self, event: RawEvent) {
        if let RawEvent::UserMessage { timestamp, text } = event {
            self.open_step(timestamp, text);
            return;
        }

        let open_ordinal = self.closed.len() + 1;
        let Some(step) = self.current.as_mut() else {
            return;
        };

        match event {
            RawEvent::UserMessage { .. } | RawEvent::Unrecognized => {}
            RawEvent::AgentMessage { message } => {
                set_first(&mut step.agent_summary, message);
            }
            RawEvent::Message { text } => {
                step.agent_output.push_str(&text);
            }
            RawEvent::Reasoning { summary } => {
                set_first(&mut step.reasoning_summary, summary);
            }
            RawEvent::FunctionCall {
                name,
                arguments,
                call_id,
            } => {
                let slot = ToolSlot {
                    step: open_ordinal,
                    tool: step.tools.len(),
                };
                if !call_id.is_empty() {
                    match self.call_index.get(&call_id) {
                        Some(existing) => tracing::warn!(
                            call_id = %call_id,
                            first_step = existing.step,
                            step = open_ordinal,
                            "duplicate call_id; keeping the first registration"
                        ),
                        None => {
                            self.call_index.insert(call_id.clone(), slot);
                        }
                    }
                }
                step.tools.push(ToolCall::pending(name, arguments, call_id));
            }
            RawEvent::FunctionCallOutput { call_id, output } => {
                let Some(slot) = self.call_index.get(&call_id).copied() else {
                    tracing::debug!(call_id = %call_id, "dropping output for unknown call_id");
                    return;
                };
                if slot.step != open_ordinal {
                    tracing::warn!(
                        call_id = %call_id,
                        call_step = slot.step,
                        step = open_ordinal,
                        "dropping output for a call whose step already closed"
                    );
                    return;
                }
                if let Some(tool) = step.tools.get_mut(slot.tool) {
                    tool.resolve(output);
                }
            }
        }
    }

    fn open_step(&mut self, timestamp: Option<String>, text: String) {
        if let Some(done) = self.current.take() {
            self.closed.push(done);
        }
        let ordinal = self.closed.len() + 1;
        self.current = Some(Step::new(ordinal, timestamp, text));
    }

    /// Number of lines skipped because they were not valid JSON.
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Close the open step and fill in missing reasoning digests.
    pub fn finish(mut self) -> Vec<Step> {
        if let Some(done) = self.current.take() {
            self.closed.push(done);
        }
        if self.skipped_lines > 0 {
            tracing::debug!(skipped = self.skipped_lines, "skipped unparseable lines");
        }
        for step in &mut self.closed {
            if step.reasoning_summary.is_empty() {
                step.reasoning_summary = synthesize_reasoning(step);
            }
        }
        self.closed
    }
}

/// Assign `source` to `target` only while `target` is still empty.
fn set_first(target: &mut String, source: String) {
    if target.is_empty() {
        *target = source;
    }
}
