use serde_json::Value;
use tokensync_types::TokenCounts;

use crate::builder::RecordDraft;
use crate::fields::{find_str, find_timestamp, find_u64};

/// Build a record draft from one `taskHistory.json` entry.
///
/// The extensions share a lineage but renamed fields over time, so every
/// field is looked up under each spelling seen in the wild.
pub(crate) fn draft_from_entry(source: &str, index: usize, entry: &Value) -> RecordDraft {
    let tokens = TokenCounts::new(
        find_u64(entry, &[&["tokensIn"], &["tokens_in"], &["inputTokens"]]).unwrap_or(0),
        find_u64(entry, &[&["tokensOut"], &["tokens_out"], &["outputTokens"]]).unwrap_or(0),
        find_u64(entry, &[&["cacheWrites"], &["cache_writes"]]).unwrap_or(0),
        find_u64(entry, &[&["cacheReads"], &["cache_reads"]]).unwrap_or(0),
    );

    let ts = entry.get("ts").filter(|v| !v.is_null());
    let id = find_str(entry, &[&["id"]])
        .map(str::to_string)
        .or_else(|| {
            ts.map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
        })
        .unwrap_or_else(|| format!("{source}:{index}"));

    RecordDraft {
        session_id: id.clone(),
        id,
        model: find_str(entry, &[&["modelId"], &["apiModelId"], &["model"]]).map(str::to_string),
        timestamp: find_timestamp(entry, &[&["ts"], &["timestamp"]]),
        tokens,
        cwd: find_str(
            entry,
            &[&["workspace"], &["cwd"], &["cwdOnTaskInitialization"]],
        )
        .map(str::to_string),
    }
}
