use serde_json::Value;
use std::path::Path;
use tokensync_types::TokenCounts;

use super::index::SessionIndex;
use crate::builder::{RecordDraft, file_mtime_timestamp, file_stem};
use crate::fields::{find_str, find_timestamp, find_u64};
use crate::incremental::FileDecode;
use crate::{Error, Result};

pub(crate) const SOURCE: &str = "opencode";

/// Decode one message document (`message/<sessionID>/<messageID>.json`).
pub(crate) fn decode_opencode_message(path: &Path, index: &SessionIndex) -> Result<FileDecode> {
    let text = std::fs::read_to_string(path)?;
    let doc: Value = serde_json::from_str(&text)?;
    if !doc.is_object() {
        return Err(Error::Parse("message document is not an object".to_string()));
    }

    let mut decoded = FileDecode::default();
    if find_str(&doc, &[&["role"]]) != Some("assistant") {
        return Ok(decoded);
    }
    let Some(tokens) = doc.get("tokens").filter(|t| t.is_object()) else {
        return Ok(decoded);
    };

    let session_id = find_str(&doc, &[&["sessionID"], &["sessionId"]])
        .map(str::to_string)
        .or_else(|| {
            path.parent()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().to_string())
        })
        .unwrap_or_else(|| file_stem(path));
    let session = index.get(&session_id);

    let timestamp = find_timestamp(&doc, &[&["time", "created"], &["time", "completed"]])
        .or_else(|| session.and_then(|s| s.created.clone()));
    let cwd = find_str(&doc, &[&["path", "cwd"]])
        .map(str::to_string)
        .or_else(|| session.and_then(|s| s.directory.clone()));

    let reasoning = find_u64(tokens, &[&["reasoning"]]).unwrap_or(0);
    let draft = RecordDraft {
        id: find_str(&doc, &[&["id"]])
            .map(str::to_string)
            .unwrap_or_else(|| file_stem(path)),
        session_id,
        model: find_str(&doc, &[&["modelID"], &["modelId"]]).map(str::to_string),
        timestamp,
        tokens: TokenCounts::new(
            find_u64(tokens, &[&["input"]]).unwrap_or(0),
            find_u64(tokens, &[&["output"]]).unwrap_or(0),
            find_u64(tokens, &[&["cache", "write"]]).unwrap_or(0),
            find_u64(tokens, &[&["cache", "read"]]).unwrap_or(0),
        )
        .with_reasoning(reasoning),
        cwd,
    };
    decoded
        .records
        .extend(draft.finish(SOURCE, &file_mtime_timestamp(path)));
    Ok(decoded)
}
