use std::path::Path;
use tokensync_types::{TokenCounts, UsageRecord, timestamp_from_system_time};

pub(crate) const UNKNOWN_MODEL: &str = "unknown";

/// Adapter-side view of a record before the shared rules are applied.
#[derive(Debug, Clone)]
pub(crate) struct RecordDraft {
    pub id: String,
    pub session_id: String,
    pub model: Option<String>,
    pub timestamp: Option<String>,
    pub tokens: TokenCounts,
    pub cwd: Option<String>,
}

impl RecordDraft {
    /// Apply the rules every adapter shares: drop units with no token signal,
    /// default the model, and fall back to `fallback_timestamp` (normally
    /// the file mtime) when the unit carries no usable time.
    pub fn finish(self, source: &str, fallback_timestamp: &str) -> Option<UsageRecord> {
        if self.tokens.is_empty() {
            return None;
        }
        Some(UsageRecord {
            id: self.id,
            session_id: self.session_id,
            source: source.to_string(),
            model: self
                .model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_MODEL.to_string()),
            timestamp: self
                .timestamp
                .unwrap_or_else(|| fallback_timestamp.to_string()),
            input_tokens: self.tokens.input,
            output_tokens: self.tokens.output,
            cache_creation_tokens: self.tokens.cache_creation,
            cache_read_tokens: self.tokens.cache_read,
            reasoning_tokens: self.tokens.reasoning,
            cwd: self.cwd,
        })
    }
}

/// Last-resort timestamp for units without one: the file's mtime.
pub(crate) fn file_mtime_timestamp(path: &Path) -> String {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(timestamp_from_system_time)
        .unwrap_or_else(|_| tokensync_types::now_timestamp())
}

/// File name without extension, used as session id of last resort.
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(tokens: TokenCounts) -> RecordDraft {
        RecordDraft {
            id: "id".to_string(),
            session_id: "s".to_string(),
            model: None,
            timestamp: None,
            tokens,
            cwd: None,
        }
    }

    #[test]
    fn test_zero_usage_is_dropped() {
        assert!(draft(TokenCounts::default()).finish("x", "t").is_none());
    }

    #[test]
    fn test_defaults_applied() {
        let record = draft(TokenCounts::new(1, 0, 0, 0))
            .finish("codex", "2025-01-01T00:00:00.000Z")
            .unwrap();
        assert_eq!(record.model, UNKNOWN_MODEL);
        assert_eq!(record.timestamp, "2025-01-01T00:00:00.000Z");
        assert_eq!(record.source, "codex");
    }
}
