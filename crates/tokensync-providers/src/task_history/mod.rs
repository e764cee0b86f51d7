//! Shared adapter for VS Code extensions that keep a single growing
//! `taskHistory.json` array (Cline and its forks).

mod entry;
mod spec;

pub use self::spec::{CLINE, KILO_CODE, ROO_CODE, TaskHistorySpec};

use serde_json::Value;
use std::path::{Path, PathBuf};
use tokensync_engine::aggregate;
use tokensync_types::{
    DocumentCheckpoint, FileFingerprint, IncrementalParseResult, ParseOptions, ScanProgress,
    SourceCheckpoint, UnitError, UsageStats,
};
use tracing::{debug, warn};

use self::entry::draft_from_entry;
use crate::builder::file_mtime_timestamp;
use crate::paths::task_history_candidates;
use crate::traits::UsageParser;
use crate::{Error, Result};

pub struct TaskHistorySource {
    spec: &'static TaskHistorySpec,
    candidates: Vec<PathBuf>,
}

impl TaskHistorySource {
    /// Use the default editor locations for this extension.
    pub fn new(spec: &'static TaskHistorySpec) -> Self {
        Self::with_candidates(spec, task_history_candidates(spec.extension_dir))
    }

    /// `candidates` are `taskHistory.json` paths in priority order.
    pub fn with_candidates(spec: &'static TaskHistorySpec, candidates: Vec<PathBuf>) -> Self {
        Self { spec, candidates }
    }

    fn active_document(&self) -> Option<&Path> {
        self.candidates
            .iter()
            .map(PathBuf::as_path)
            .find(|path| path.is_file())
    }

    /// Result that decodes nothing and keeps whatever marker was stored.
    fn unchanged(
        &self,
        previous: Option<&DocumentCheckpoint>,
        files_processed: usize,
        skipped_files: usize,
        errors: Vec<UnitError>,
    ) -> IncrementalParseResult {
        let checkpoint = previous.cloned().unwrap_or(DocumentCheckpoint {
            path: None,
            mtime: 0,
            size: 0,
            record_count: 0,
        });
        IncrementalParseResult {
            records: Vec::new(),
            stats: UsageStats::default(),
            files_processed,
            errors,
            checkpoint: SourceCheckpoint::Document(checkpoint),
            is_incremental: previous.is_some(),
            skipped_files,
        }
    }
}

fn read_array(path: &Path) -> Result<Vec<Value>> {
    let text = std::fs::read_to_string(path)?;
    match serde_json::from_str(&text)? {
        Value::Array(entries) => Ok(entries),
        _ => Err(Error::Parse("task history is not a JSON array".to_string())),
    }
}

/// Index of the first entry that still needs decoding.
///
/// Resuming is only safe when the same document grew in place; anything else
/// (another editor install, a truncated or rewritten file) starts over.
fn resume_index(
    previous: Option<&DocumentCheckpoint>,
    path_key: &str,
    fingerprint: FileFingerprint,
    len: usize,
) -> usize {
    let Some(previous) = previous else {
        return 0;
    };
    let same_document = previous.path.as_deref().is_none_or(|p| p == path_key);
    if same_document && len >= previous.record_count && fingerprint.size >= previous.size {
        previous.record_count
    } else {
        0
    }
}

impl UsageParser for TaskHistorySource {
    fn id(&self) -> &'static str {
        self.spec.id
    }

    fn display_name(&self) -> &'static str {
        self.spec.display_name
    }

    fn roots(&self) -> &[PathBuf] {
        &self.candidates
    }

    fn exists(&self) -> bool {
        self.active_document().is_some()
    }

    fn parse_incremental(
        &self,
        checkpoint: Option<&SourceCheckpoint>,
        options: ParseOptions<'_>,
    ) -> IncrementalParseResult {
        let source = self.spec.id;
        let previous = checkpoint.and_then(SourceCheckpoint::as_document);

        let Some(path) = self.active_document() else {
            return self.unchanged(previous, 0, 0, Vec::new());
        };
        let path_key = path.to_string_lossy().to_string();

        let fingerprint = match std::fs::metadata(path) {
            Ok(metadata) => FileFingerprint::from_metadata(&metadata),
            Err(err) => {
                return self.unchanged(previous, 0, 0, vec![UnitError::new(path_key, err)]);
            }
        };
        // Without an mtime nothing can be proven unchanged; 0 never matches a real file
        let fingerprint = fingerprint.unwrap_or(FileFingerprint::new(0, 0));

        if let Some(prior) = previous
            && prior.path.as_deref().is_none_or(|p| p == path_key)
            && fingerprint.mtime != 0
            && prior.fingerprint() == fingerprint
        {
            debug!(source, file = %path.display(), "task history unchanged");
            return self.unchanged(previous, 0, 1, Vec::new());
        }

        let entries = match read_array(path) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(source, file = %path.display(), error = %err, "skipping unreadable task history");
                return self.unchanged(previous, 1, 0, vec![UnitError::new(path_key, err)]);
            }
        };

        let start = resume_index(previous, &path_key, fingerprint, entries.len());
        let end = options
            .limit
            .map_or(entries.len(), |limit| start.saturating_add(limit).min(entries.len()));
        let fallback_timestamp = file_mtime_timestamp(path);

        let mut records = Vec::new();
        let mut errors = Vec::new();
        for (index, entry) in entries.iter().enumerate().take(end).skip(start) {
            if entry.is_object() {
                records.extend(draft_from_entry(source, index, entry).finish(source, &fallback_timestamp));
            } else {
                errors.push(UnitError::new(
                    format!("{}[{}]", path.display(), index),
                    "task entry is not an object",
                ));
            }
            options.report(ScanProgress {
                source,
                processed: index - start + 1,
                total: entries.len() - start,
            });
        }
        debug!(source, start, end, records = records.len(), "decoded task history");

        let checkpoint = DocumentCheckpoint {
            path: Some(path_key),
            // A partially consumed document must never look unchanged
            mtime: if end < entries.len() { 0 } else { fingerprint.mtime },
            size: fingerprint.size,
            record_count: end,
        };
        let stats = aggregate(&records);
        IncrementalParseResult {
            records,
            stats,
            files_processed: 1,
            errors,
            checkpoint: SourceCheckpoint::Document(checkpoint),
            is_incremental: previous.is_some(),
            skipped_files: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn entries(range: std::ops::Range<usize>) -> Vec<Value> {
        range
            .map(|i| json!({"id": format!("t{i}"), "ts": 1_735_000_000_000i64 + i as i64, "tokensIn": 10, "tokensOut": 5}))
            .collect()
    }

    #[test]
    fn test_candidate_priority() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a/taskHistory.json");
        let second = dir.path().join("b/taskHistory.json");
        std::fs::create_dir_all(second.parent().unwrap()).unwrap();
        std::fs::write(&second, "[]").unwrap();

        let source = TaskHistorySource::with_candidates(&CLINE, vec![first.clone(), second.clone()]);
        assert_eq!(source.active_document(), Some(second.as_path()));

        std::fs::create_dir_all(first.parent().unwrap()).unwrap();
        std::fs::write(&first, "[]").unwrap();
        assert_eq!(source.active_document(), Some(first.as_path()));
    }

    #[test]
    fn test_limit_marks_document_partial() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taskHistory.json");
        std::fs::write(&path, serde_json::to_string(&entries(0..5)).unwrap()).unwrap();
        let source = TaskHistorySource::with_candidates(&ROO_CODE, vec![path]);

        let first = source.parse_incremental(None, ParseOptions::default().with_limit(3));
        assert_eq!(first.records.len(), 3);
        let marker = first.checkpoint.as_document().unwrap();
        assert_eq!(marker.record_count, 3);
        assert_eq!(marker.mtime, 0);

        let second = source.parse_incremental(Some(&first.checkpoint), ParseOptions::default());
        assert_eq!(second.skipped_files, 0);
        let ids: Vec<_> = second.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["t3", "t4"]);
        assert_ne!(second.checkpoint.as_document().unwrap().mtime, 0);
    }

    #[test]
    fn test_shrunk_document_rescanned() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taskHistory.json");
        std::fs::write(&path, serde_json::to_string(&entries(0..4)).unwrap()).unwrap();
        let source = TaskHistorySource::with_candidates(&KILO_CODE, vec![path.clone()]);
        let first = source.parse_incremental(None, ParseOptions::default());

        std::fs::write(&path, serde_json::to_string(&entries(0..2)).unwrap()).unwrap();
        let second = source.parse_incremental(Some(&first.checkpoint), ParseOptions::default());
        assert_eq!(second.records.len(), 2);
        assert_eq!(second.checkpoint.as_document().unwrap().record_count, 2);
    }

    #[test]
    fn test_non_array_is_reported_and_not_advanced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("taskHistory.json");
        std::fs::write(&path, r#"{"tasks": []}"#).unwrap();
        let source = TaskHistorySource::with_candidates(&CLINE, vec![path]);

        let result = source.parse_incremental(None, ParseOptions::default());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.files_processed, 1);
        assert_eq!(result.checkpoint.as_document().unwrap().record_count, 0);
    }

    #[test]
    fn test_missing_document() {
        let source = TaskHistorySource::with_candidates(&CLINE, vec![PathBuf::from("/nope/taskHistory.json")]);
        assert!(!source.exists());
        let result = source.parse(ParseOptions::default());
        assert!(result.records.is_empty());
        assert!(result.errors.is_empty());
    }
}
