use serde_json::Value;

use crate::fields::find_u64;

/// Cumulative or per-turn usage as reported in a `token_count` event.
///
/// Codex counts cached input inside `input_tokens`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CodexUsage {
    pub input: u64,
    pub cached_input: u64,
    pub output: u64,
    pub reasoning_output: u64,
}

impl CodexUsage {
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Self {
            input: find_u64(value, &[&["input_tokens"]]).unwrap_or(0),
            cached_input: find_u64(value, &[&["cached_input_tokens"], &["cache_read_input_tokens"]])
                .unwrap_or(0),
            output: find_u64(value, &[&["output_tokens"]]).unwrap_or(0),
            reasoning_output: find_u64(value, &[&["reasoning_output_tokens"]]).unwrap_or(0),
        })
    }

    /// Usage accrued between two cumulative snapshots.
    pub fn delta_since(&self, previous: &Self) -> Self {
        Self {
            input: self.input.saturating_sub(previous.input),
            cached_input: self.cached_input.saturating_sub(previous.cached_input),
            output: self.output.saturating_sub(previous.output),
            reasoning_output: self.reasoning_output.saturating_sub(previous.reasoning_output),
        }
    }
}

/// The line kinds that matter for usage accounting.
#[derive(Debug)]
pub(crate) enum CodexLine<'a> {
    SessionMeta(&'a Value),
    TurnContext(&'a Value),
    TokenCount(&'a Value),
    Other,
}

impl<'a> CodexLine<'a> {
    pub fn classify(line: &'a Value) -> Self {
        let Some(payload) = line.get("payload") else {
            return CodexLine::Other;
        };
        match line.get("type").and_then(Value::as_str) {
            Some("session_meta") => CodexLine::SessionMeta(payload),
            Some("turn_context") => CodexLine::TurnContext(payload),
            Some("event_msg")
                if payload.get("type").and_then(Value::as_str) == Some("token_count") =>
            {
                CodexLine::TokenCount(payload)
            }
            _ => CodexLine::Other,
        }
    }
}
