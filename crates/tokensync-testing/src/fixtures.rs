//! Builders for source transcripts in the shapes each tool writes.

use serde_json::{Value, json};
use sha2::{Digest, Sha256};

/// One assistant turn in a Claude Code transcript.
#[derive(Debug, Clone)]
pub struct ClaudeTurn {
    pub message_id: String,
    pub request_id: String,
    pub model: String,
    pub timestamp: String,
    pub input: u64,
    pub output: u64,
    pub cache_creation: u64,
    pub cache_read: u64,
}

impl ClaudeTurn {
    pub fn new(n: usize, timestamp: &str) -> Self {
        Self {
            message_id: format!("msg_{n:04}"),
            request_id: format!("req_{n:04}"),
            model: "claude-sonnet-4-5".to_string(),
            timestamp: timestamp.to_string(),
            input: 100 + n as u64,
            output: 20,
            cache_creation: 5,
            cache_read: 1000,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_tokens(mut self, input: u64, output: u64, cache_creation: u64, cache_read: u64) -> Self {
        self.input = input;
        self.output = output;
        self.cache_creation = cache_creation;
        self.cache_read = cache_read;
        self
    }
}

pub fn claude_user_line(session_id: &str, text: &str, timestamp: &str) -> String {
    json!({
        "type": "user",
        "sessionId": session_id,
        "uuid": format!("user-{timestamp}"),
        "timestamp": timestamp,
        "cwd": "/work/project",
        "message": {"role": "user", "content": text}
    })
    .to_string()
}

pub fn claude_assistant_line(session_id: &str, turn: &ClaudeTurn) -> String {
    json!({
        "type": "assistant",
        "sessionId": session_id,
        "uuid": format!("uuid-{}", turn.message_id),
        "requestId": turn.request_id,
        "timestamp": turn.timestamp,
        "cwd": "/work/project",
        "message": {
            "id": turn.message_id,
            "role": "assistant",
            "model": turn.model,
            "content": [{"type": "text", "text": "ok"}],
            "usage": {
                "input_tokens": turn.input,
                "output_tokens": turn.output,
                "cache_creation_input_tokens": turn.cache_creation,
                "cache_read_input_tokens": turn.cache_read
            }
        }
    })
    .to_string()
}

pub fn codex_session_meta(session_id: &str, cwd: &str) -> String {
    json!({
        "timestamp": "2025-06-01T09:00:00.000Z",
        "type": "session_meta",
        "payload": {"id": session_id, "cwd": cwd, "originator": "codex_cli_rs"}
    })
    .to_string()
}

pub fn codex_turn_context(model: &str) -> String {
    json!({
        "timestamp": "2025-06-01T09:00:01.000Z",
        "type": "turn_context",
        "payload": {"model": model, "cwd": "/work/project", "approval_policy": "on-request"}
    })
    .to_string()
}

/// Codex usage snapshot: `(input incl. cached, cached, output, reasoning)`.
pub type CodexTokens = (u64, u64, u64, u64);

fn codex_usage((input, cached, output, reasoning): CodexTokens) -> Value {
    json!({
        "input_tokens": input,
        "cached_input_tokens": cached,
        "output_tokens": output,
        "reasoning_output_tokens": reasoning,
        "total_tokens": input + output
    })
}

pub fn codex_token_count(timestamp: &str, last: CodexTokens, total: CodexTokens) -> String {
    json!({
        "timestamp": timestamp,
        "type": "event_msg",
        "payload": {
            "type": "token_count",
            "info": {
                "total_token_usage": codex_usage(total),
                "last_token_usage": codex_usage(last),
                "model_context_window": 272000
            }
        }
    })
    .to_string()
}

/// Directory name Gemini CLI uses for a project: SHA-256 of its root path.
pub fn gemini_project_hash(project_root: &str) -> String {
    let digest = Sha256::digest(project_root.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn gemini_message(id: &str, timestamp: &str, input: u64, output: u64, cached: u64) -> Value {
    json!({
        "id": id,
        "timestamp": timestamp,
        "type": "gemini",
        "content": "done",
        "model": "gemini-2.5-pro",
        "tokens": {
            "input": input,
            "output": output,
            "cached": cached,
            "thoughts": 0,
            "tool": 0,
            "total": input + output
        }
    })
}

pub fn gemini_chat(session_id: &str, start_time: &str, messages: Vec<Value>) -> Value {
    json!({
        "sessionId": session_id,
        "projectHash": "0000",
        "startTime": start_time,
        "lastUpdated": start_time,
        "messages": messages
    })
}

/// A Cline-style task history entry.
pub fn task_entry(n: usize) -> Value {
    json!({
        "id": format!("task-{n}"),
        "ts": 1_735_689_600_000i64 + (n as i64) * 3_600_000,
        "task": format!("task number {n}"),
        "tokensIn": 1000 + n as u64,
        "tokensOut": 200,
        "cacheWrites": 50,
        "cacheReads": 400,
        "totalCost": 0.01,
        "apiModelId": "claude-sonnet-4-5"
    })
}

pub fn task_entries(range: std::ops::Range<usize>) -> Vec<Value> {
    range.map(task_entry).collect()
}

pub fn opencode_session(session_id: &str, directory: &str, created_ms: i64) -> Value {
    json!({
        "id": session_id,
        "version": "0.9.0",
        "projectID": "proj",
        "directory": directory,
        "title": "session",
        "time": {"created": created_ms, "updated": created_ms}
    })
}

pub fn opencode_assistant_message(
    message_id: &str,
    session_id: &str,
    created_ms: Option<i64>,
    input: u64,
    output: u64,
) -> Value {
    let mut message = json!({
        "id": message_id,
        "sessionID": session_id,
        "role": "assistant",
        "modelID": "claude-sonnet-4",
        "providerID": "anthropic",
        "cost": 0,
        "tokens": {"input": input, "output": output, "reasoning": 0, "cache": {"read": 10, "write": 0}}
    });
    if let Some(created) = created_ms {
        message["time"] = json!({"created": created, "completed": created + 1000});
    }
    message
}
