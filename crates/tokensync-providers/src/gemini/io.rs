use serde_json::Value;
use std::path::Path;
use tokensync_types::{TokenCounts, UnitError};

use crate::builder::{RecordDraft, file_mtime_timestamp, file_stem};
use crate::fields::{find_str, find_timestamp, find_u64};
use crate::incremental::FileDecode;
use crate::{Error, Result};

pub(crate) const SOURCE: &str = "gemini";

/// Decode one Gemini CLI chat document (`chats/session-*.json`).
///
/// Gemini rewrites the whole document on every turn, so the file is the
/// smallest unit. A document that is not an object with a `messages` array
/// fails as a whole.
pub(crate) fn decode_gemini_file(path: &Path) -> Result<FileDecode> {
    let text = std::fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&text)?;
    let messages = doc
        .get("messages")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::Parse("missing messages array".to_string()))?;

    let session_id = find_str(&doc, &[&["sessionId"], &["session_id"]])
        .map(str::to_string)
        .unwrap_or_else(|| file_stem(path));
    let fallback_timestamp = find_timestamp(&doc, &[&["startTime"], &["lastUpdated"]])
        .unwrap_or_else(|| file_mtime_timestamp(path));

    let mut decoded = FileDecode::default();
    for (index, message) in messages.iter().enumerate() {
        if !message.is_object() {
            decoded.errors.push(UnitError::new(
                format!("{}[{}]", path.display(), index),
                "message is not an object",
            ));
            continue;
        }
        if message.get("type").and_then(Value::as_str) != Some("gemini") {
            continue;
        }
        let Some(tokens) = message.get("tokens").filter(|t| t.is_object()) else {
            continue;
        };

        let input = find_u64(tokens, &[&["input"]]).unwrap_or(0);
        let cached = find_u64(tokens, &[&["cached"]]).unwrap_or(0);
        let output = find_u64(tokens, &[&["output"]]).unwrap_or(0);
        let tool = find_u64(tokens, &[&["tool"]]).unwrap_or(0);
        let thoughts = find_u64(tokens, &[&["thoughts"]]).unwrap_or(0);

        let message_id = find_str(message, &[&["id"]])
            .map(str::to_string)
            .unwrap_or_else(|| index.to_string());

        let draft = RecordDraft {
            id: format!("{session_id}:{message_id}"),
            session_id: session_id.clone(),
            model: find_str(message, &[&["model"]]).map(str::to_string),
            timestamp: find_timestamp(message, &[&["timestamp"]]),
            tokens: TokenCounts::new(
                input.saturating_sub(cached),
                output.saturating_add(tool),
                0,
                cached,
            )
            .with_reasoning(thoughts),
            cwd: None,
        };
        decoded
            .records
            .extend(draft.finish(SOURCE, &fallback_timestamp));
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_decode_chat_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session-1.json");
        let doc = json!({
            "sessionId": "g-1",
            "startTime": "2025-05-05T08:00:00.000Z",
            "messages": [
                {"id": "m0", "type": "user", "content": "hello"},
                {"id": "m1", "type": "gemini", "model": "gemini-2.5-pro",
                 "timestamp": "2025-05-05T08:00:03.000Z",
                 "tokens": {"input": 100, "output": 20, "cached": 30, "thoughts": 7, "tool": 5}},
                {"id": "m2", "type": "gemini", "tokens": {"input": 0, "output": 0}},
                {"id": "m3", "type": "gemini", "tokens": {"input": 4, "output": 1}},
                "garbage"
            ]
        });
        std::fs::write(&path, doc.to_string()).unwrap();

        let decoded = decode_gemini_file(&path).unwrap();
        assert_eq!(decoded.errors.len(), 1);
        assert!(decoded.errors[0].unit.ends_with("session-1.json[4]"));
        assert_eq!(decoded.records.len(), 2);

        let first = &decoded.records[0];
        assert_eq!(first.id, "g-1:m1");
        assert_eq!(first.input_tokens, 70);
        assert_eq!(first.cache_read_tokens, 30);
        assert_eq!(first.output_tokens, 25);
        assert_eq!(first.reasoning_tokens, Some(7));

        // Falls back to the session start time
        assert_eq!(decoded.records[1].timestamp, "2025-05-05T08:00:00.000Z");
        assert_eq!(decoded.records[1].model, "unknown");
    }

    #[test]
    fn test_structural_error_fails_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session-2.json");
        std::fs::write(&path, r#"{"sessionId":"x"}"#).unwrap();
        assert!(matches!(decode_gemini_file(&path), Err(Error::Parse(_))));

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(decode_gemini_file(&path), Err(Error::Json(_))));
    }
}
