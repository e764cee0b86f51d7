use std::path::Path;
use tokensync_types::{TokenCounts, UnitError, normalize_timestamp};

use super::schema::{ClaudeLine, SYNTHETIC_MODEL};
use crate::Result;
use crate::builder::{RecordDraft, file_mtime_timestamp, file_stem};
use crate::incremental::{FileDecode, line_unit};

pub(crate) const SOURCE: &str = "claude_code";

/// Decode one Claude Code session file.
///
/// Only IO failures fail the whole file; a bad line becomes a unit error.
pub(crate) fn decode_claude_file(path: &Path) -> Result<FileDecode> {
    let text = std::fs::read_to_string(path)?;
    let fallback_session = file_stem(path);
    let fallback_timestamp = file_mtime_timestamp(path);

    let mut decoded = FileDecode::default();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry: ClaudeLine = match serde_json::from_str(line) {
            Ok(entry) => entry,
            Err(err) => {
                decoded
                    .errors
                    .push(UnitError::new(line_unit(path, index + 1), err));
                continue;
            }
        };
        if let Some(draft) = draft_from_line(entry, &fallback_session) {
            decoded
                .records
                .extend(draft.finish(SOURCE, &fallback_timestamp));
        }
    }
    Ok(decoded)
}

fn draft_from_line(entry: ClaudeLine, fallback_session: &str) -> Option<RecordDraft> {
    if entry.kind.as_deref() != Some("assistant") {
        return None;
    }
    let message = entry.message?;
    let usage = message.usage?;
    if message.model.as_deref() == Some(SYNTHETIC_MODEL) {
        return None;
    }

    let id = match (&message.id, &entry.request_id) {
        (Some(message_id), Some(request_id)) => format!("{message_id}:{request_id}"),
        (Some(message_id), None) => message_id.clone(),
        (None, _) => entry.uuid?,
    };

    Some(RecordDraft {
        id,
        session_id: entry
            .session_id
            .unwrap_or_else(|| fallback_session.to_string()),
        model: message.model,
        timestamp: entry.timestamp.as_deref().and_then(normalize_timestamp),
        tokens: TokenCounts::new(
            usage.input_tokens.unwrap_or(0),
            usage.output_tokens.unwrap_or(0),
            usage.cache_creation_input_tokens.unwrap_or(0),
            usage.cache_read_input_tokens.unwrap_or(0),
        ),
        cwd: entry.cwd,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SESSION: &str = r#"{"type":"user","sessionId":"s1","uuid":"u0","timestamp":"2025-03-01T10:00:00Z","message":{"role":"user","content":"hi"}}
{"type":"assistant","sessionId":"s1","uuid":"u1","requestId":"req_1","timestamp":"2025-03-01T10:00:05Z","cwd":"/work","message":{"id":"msg_1","model":"claude-sonnet-4-5","usage":{"input_tokens":10,"output_tokens":20,"cache_creation_input_tokens":30,"cache_read_input_tokens":40}}}
{"type":"assistant","sessionId":"s1","uuid":"u2","timestamp":"2025-03-01T10:00:06Z","message":{"id":"msg_2","model":"<synthetic>","usage":{"input_tokens":1,"output_tokens":1}}}
{"type":"assistant","sessionId":"s1","uuid":"u3","timestamp":"2025-03-01T10:00:07Z","message":{"id":"msg_3","model":"claude-sonnet-4-5","usage":{"input_tokens":0,"output_tokens":0}}}
not json
{"type":"assistant","uuid":"u4","timestamp":"2025-03-01T10:00:08Z","message":{"model":"claude-opus-4-1","usage":{"output_tokens":5}}}
"#;

    #[test]
    fn test_decode_session_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("abc.jsonl");
        std::fs::write(&path, SESSION).unwrap();

        let decoded = decode_claude_file(&path).unwrap();
        assert_eq!(decoded.errors.len(), 1);
        assert!(decoded.errors[0].unit.ends_with("abc.jsonl:5"));

        assert_eq!(decoded.records.len(), 2);
        let first = &decoded.records[0];
        assert_eq!(first.id, "msg_1:req_1");
        assert_eq!(first.session_id, "s1");
        assert_eq!(first.timestamp, "2025-03-01T10:00:05.000Z");
        assert_eq!(first.cache_creation_tokens, 30);
        assert_eq!(first.cache_read_tokens, 40);
        assert_eq!(first.cwd.as_deref(), Some("/work"));

        let second = &decoded.records[1];
        assert_eq!(second.id, "u4");
        assert_eq!(second.session_id, "abc");
        assert_eq!(second.output_tokens, 5);
    }
}
