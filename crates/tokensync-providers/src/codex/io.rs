use serde_json::Value;
use std::path::Path;
use tokensync_types::{TokenCounts, UnitError};

use super::schema::{CodexLine, CodexUsage};
use crate::Result;
use crate::builder::{RecordDraft, file_mtime_timestamp, file_stem};
use crate::fields::{find_str, find_timestamp};
use crate::incremental::{FileDecode, line_unit};

pub(crate) const SOURCE: &str = "codex";

/// Running context while walking one rollout file.
struct RolloutState {
    session_id: String,
    cwd: Option<String>,
    model: Option<String>,
    last_total: Option<CodexUsage>,
}

/// Decode one Codex rollout file (`rollout-*.jsonl`).
pub(crate) fn decode_codex_file(path: &Path) -> Result<FileDecode> {
    let text = std::fs::read_to_string(path)?;
    let fallback_timestamp = file_mtime_timestamp(path);
    let mut state = RolloutState {
        session_id: file_stem(path),
        cwd: None,
        model: None,
        last_total: None,
    };

    let mut decoded = FileDecode::default();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                decoded
                    .errors
                    .push(UnitError::new(line_unit(path, index + 1), err));
                continue;
            }
        };

        match CodexLine::classify(&value) {
            CodexLine::SessionMeta(payload) => {
                if let Some(id) = find_str(payload, &[&["id"], &["session_id"]]) {
                    state.session_id = id.to_string();
                }
                if let Some(cwd) = find_str(payload, &[&["cwd"]]) {
                    state.cwd = Some(cwd.to_string());
                }
            }
            CodexLine::TurnContext(payload) => {
                if let Some(model) = find_str(payload, &[&["model"]]) {
                    state.model = Some(model.to_string());
                }
                if let Some(cwd) = find_str(payload, &[&["cwd"]]) {
                    state.cwd = Some(cwd.to_string());
                }
            }
            CodexLine::TokenCount(payload) => {
                let Some(usage) = state.usage_from_event(payload) else {
                    continue;
                };
                let draft = RecordDraft {
                    id: format!("{}:{}", state.session_id, index + 1),
                    session_id: state.session_id.clone(),
                    model: state.model.clone(),
                    timestamp: find_timestamp(&value, &[&["timestamp"]]),
                    tokens: TokenCounts::new(
                        usage.input.saturating_sub(usage.cached_input),
                        usage.output,
                        0,
                        usage.cached_input,
                    )
                    .with_reasoning(usage.reasoning_output),
                    cwd: state.cwd.clone(),
                };
                decoded
                    .records
                    .extend(draft.finish(SOURCE, &fallback_timestamp));
            }
            CodexLine::Other => {}
        }
    }
    Ok(decoded)
}

impl RolloutState {
    /// Per-turn usage of a `token_count` event, or `None` for repeats and
    /// events without usage info.
    fn usage_from_event(&mut self, payload: &Value) -> Option<CodexUsage> {
        let info = payload.get("info").filter(|v| v.is_object())?;
        if let Some(model) = find_str(info, &[&["model"]]) {
            self.model = Some(model.to_string());
        }

        let total = info
            .get("total_token_usage")
            .and_then(CodexUsage::from_value);
        if total.is_some() && total == self.last_total {
            return None;
        }
        let previous = self.last_total;
        if total.is_some() {
            self.last_total = total;
        }

        if let Some(last) = info
            .get("last_token_usage")
            .and_then(CodexUsage::from_value)
        {
            return Some(last);
        }
        let total = total?;
        Some(match previous {
            Some(previous) => total.delta_since(&previous),
            None => total,
        })
    }
}
