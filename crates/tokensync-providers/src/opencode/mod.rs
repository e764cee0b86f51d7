mod index;
mod io;

use std::path::{Path, PathBuf};
use tokensync_types::{IncrementalParseResult, ParseOptions, SourceCheckpoint};
use tracing::debug;

use self::index::SessionIndex;
use self::io::decode_opencode_message;
use crate::incremental::{FileSet, scan_files};
use crate::paths::opencode_roots;
use crate::traits::UsageParser;

/// OpenCode: one JSON document per message, plus a session index holding
/// the working directory and creation time.
pub struct OpenCodeSource {
    roots: Vec<PathBuf>,
}

impl Default for OpenCodeSource {
    fn default() -> Self {
        Self::new(opencode_roots())
    }
}

impl OpenCodeSource {
    /// `roots` are storage directories (the parents of `message/` and `session/`).
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    fn message_dirs(&self) -> Vec<PathBuf> {
        self.roots.iter().map(|root| root.join("message")).collect()
    }
}

fn is_message_file(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "json")
}

impl UsageParser for OpenCodeSource {
    fn id(&self) -> &'static str {
        io::SOURCE
    }

    fn display_name(&self) -> &'static str {
        "OpenCode"
    }

    fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn exists(&self) -> bool {
        self.message_dirs().iter().any(|dir| dir.is_dir())
    }

    fn parse_incremental(
        &self,
        checkpoint: Option<&SourceCheckpoint>,
        options: ParseOptions<'_>,
    ) -> IncrementalParseResult {
        let files = FileSet::collect(&self.message_dirs(), 2, is_message_file);

        // The index is only read when at least one message needs decoding
        let mut index: Option<SessionIndex> = None;
        scan_files(io::SOURCE, files, checkpoint, options, |path| {
            let index = index.get_or_insert_with(|| {
                let loaded = SessionIndex::load(&self.roots);
                debug!(sessions = loaded.len(), "loaded opencode session index");
                loaded
            });
            decode_opencode_message(path, index)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_json(path: PathBuf, value: serde_json::Value) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, value.to_string()).unwrap();
    }

    #[test]
    fn test_session_index_supplies_metadata() {
        let dir = TempDir::new().unwrap();
        let storage = dir.path().to_path_buf();
        write_json(
            storage.join("session/proj1/ses_1.json"),
            json!({"id": "ses_1", "directory": "/code/app", "time": {"created": 1_735_700_000_000i64}}),
        );
        write_json(
            storage.join("message/ses_1/msg_a.json"),
            json!({
                "id": "msg_a", "sessionID": "ses_1", "role": "assistant",
                "modelID": "claude-sonnet-4",
                "tokens": {"input": 12, "output": 3, "reasoning": 0, "cache": {"read": 100, "write": 7}}
            }),
        );
        write_json(
            storage.join("message/ses_1/msg_u.json"),
            json!({"id": "msg_u", "sessionID": "ses_1", "role": "user", "time": {"created": 1}}),
        );

        let source = OpenCodeSource::new(vec![storage]);
        assert!(source.exists());
        let result = source.parse(ParseOptions::default());

        assert!(result.errors.is_empty());
        assert_eq!(result.files_processed, 2);
        assert_eq!(result.records.len(), 1);
        let record = &result.records[0];
        assert_eq!(record.id, "msg_a");
        assert_eq!(record.cwd.as_deref(), Some("/code/app"));
        assert_eq!(record.timestamp, "2025-01-01T02:53:20.000Z");
        assert_eq!(record.cache_creation_tokens, 7);
        assert_eq!(record.cache_read_tokens, 100);
    }
}
