//! Shared scan loop for sources stored as many independent files.
//!
//! Every file is a unit fingerprinted by `{mtime, size}`. A file whose
//! fingerprint matches the prior checkpoint is never opened; any mismatch
//! re-decodes the whole file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokensync_engine::aggregate;
use tokensync_types::{
    FileFingerprint, IncrementalParseResult, ParseOptions, ScanProgress, SourceCheckpoint,
    UnitError, UsageRecord,
};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::Result;

/// Files found under a source's roots, plus traversal problems.
#[derive(Debug, Default)]
pub(crate) struct FileSet {
    pub files: Vec<PathBuf>,
    pub errors: Vec<UnitError>,
}

impl FileSet {
    /// Walk every existing root, keeping files accepted by `accept`.
    /// Missing roots are not errors: the tool may simply not be installed.
    pub fn collect<F>(roots: &[PathBuf], max_depth: usize, accept: F) -> Self
    where
        F: Fn(&Path) -> bool,
    {
        let mut set = FileSet::default();
        for root in roots.iter().filter(|r| r.is_dir()) {
            for entry in WalkDir::new(root).max_depth(max_depth).follow_links(false) {
                match entry {
                    Ok(entry) => {
                        if entry.file_type().is_file() && accept(entry.path()) {
                            set.files.push(entry.into_path());
                        }
                    }
                    Err(err) => {
                        let unit = err
                            .path()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| root.display().to_string());
                        set.errors.push(UnitError::new(unit, err));
                    }
                }
            }
        }
        set.files.sort();
        set.files.dedup();
        set
    }
}

/// Records and line-level errors decoded from one file.
#[derive(Debug, Default)]
pub(crate) struct FileDecode {
    pub records: Vec<UsageRecord>,
    pub errors: Vec<UnitError>,
}

/// Unit name for a line inside a file (1-based).
pub(crate) fn line_unit(path: &Path, line_number: usize) -> String {
    format!("{}:{}", path.display(), line_number)
}

/// Drive `decode` over `files`, honoring the checkpoint and options.
///
/// `decode` returning `Err` marks the whole file as failed: its records are
/// discarded and it stays out of the new checkpoint so the next run retries it.
pub(crate) fn scan_files<F>(
    source: &'static str,
    discovered: FileSet,
    checkpoint: Option<&SourceCheckpoint>,
    options: ParseOptions<'_>,
    mut decode: F,
) -> IncrementalParseResult
where
    F: FnMut(&Path) -> Result<FileDecode>,
{
    let previous = checkpoint.and_then(SourceCheckpoint::as_files);
    let FileSet { files, mut errors } = discovered;

    let total = files.len();
    let mut next: BTreeMap<String, FileFingerprint> = BTreeMap::new();
    let mut records = Vec::new();
    let mut files_processed = 0;
    let mut skipped_files = 0;

    for (index, path) in files.iter().enumerate() {
        let key = path.to_string_lossy().to_string();
        let progress = ScanProgress {
            source,
            processed: index + 1,
            total,
        };

        let fingerprint = match std::fs::metadata(path) {
            Ok(metadata) => FileFingerprint::from_metadata(&metadata),
            Err(err) => {
                errors.push(UnitError::new(key, err));
                options.report(progress);
                continue;
            }
        };
        let previous_fingerprint = previous.and_then(|files| files.get(&key));

        if let (Some(current), Some(prior)) = (fingerprint, previous_fingerprint)
            && current == *prior
        {
            skipped_files += 1;
            next.insert(key, current);
            options.report(progress);
            continue;
        }

        if options.limit.is_some_and(|limit| files_processed >= limit) {
            // Not decoded this run: keep the stale fingerprint so it still mismatches
            if let Some(prior) = previous_fingerprint {
                next.insert(key, *prior);
            }
            options.report(progress);
            continue;
        }

        files_processed += 1;
        match decode(path) {
            Ok(decoded) => {
                debug!(
                    source,
                    file = %path.display(),
                    records = decoded.records.len(),
                    errors = decoded.errors.len(),
                    "decoded file"
                );
                records.extend(decoded.records);
                errors.extend(decoded.errors);
                if let Some(current) = fingerprint {
                    next.insert(key, current);
                }
            }
            Err(err) => {
                warn!(source, file = %path.display(), error = %err, "skipping unreadable file");
                errors.push(UnitError::new(key, err));
            }
        }
        options.report(progress);
    }

    let stats = aggregate(&records);
    IncrementalParseResult {
        records,
        stats,
        files_processed,
        errors,
        checkpoint: SourceCheckpoint::Files(next),
        is_incremental: previous.is_some(),
        skipped_files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;
    use tokensync_types::TokenCounts;

    use crate::builder::RecordDraft;

    fn decode_one(path: &Path) -> Result<FileDecode> {
        let text = std::fs::read_to_string(path)?;
        if text.starts_with("bad") {
            return Err(crate::Error::Parse("bad file".to_string()));
        }
        let record = RecordDraft {
            id: path.display().to_string(),
            session_id: "s".to_string(),
            model: None,
            timestamp: Some("2025-01-01T00:00:00.000Z".to_string()),
            tokens: TokenCounts::new(text.len() as u64, 0, 0, 0),
            cwd: None,
        }
        .finish("test", "");
        Ok(FileDecode {
            records: record.into_iter().collect(),
            errors: Vec::new(),
        })
    }

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_failed_file_left_out_of_checkpoint() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.log", "good");
        let bad = write(dir.path(), "b.log", "bad");

        let set = FileSet::collect(&[dir.path().to_path_buf()], 1, |_| true);
        let result = scan_files("test", set, None, ParseOptions::default(), decode_one);

        assert_eq!(result.files_processed, 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.records.len(), 1);
        let files = result.checkpoint.as_files().unwrap();
        assert_eq!(files.len(), 1);
        assert!(!files.contains_key(&bad.to_string_lossy().to_string()));
    }

    #[test]
    fn test_limit_defers_remaining_files() {
        let dir = TempDir::new().unwrap();
        for name in ["a.log", "b.log", "c.log"] {
            write(dir.path(), name, "good");
        }
        let roots = [dir.path().to_path_buf()];

        let first = scan_files(
            "test",
            FileSet::collect(&roots, 1, |_| true),
            None,
            ParseOptions::default().with_limit(2),
            decode_one,
        );
        assert_eq!(first.files_processed, 2);
        assert_eq!(first.checkpoint.as_files().unwrap().len(), 2);

        let second = scan_files(
            "test",
            FileSet::collect(&roots, 1, |_| true),
            Some(&first.checkpoint),
            ParseOptions::default().with_limit(2),
            decode_one,
        );
        assert_eq!(second.files_processed, 1);
        assert_eq!(second.skipped_files, 2);
        assert_eq!(second.checkpoint.as_files().unwrap().len(), 3);
    }

    #[test]
    fn test_progress_reaches_total_when_limited() {
        let dir = TempDir::new().unwrap();
        for name in ["a.log", "b.log", "c.log"] {
            write(dir.path(), name, "good");
        }
        let seen = RefCell::new(Vec::new());
        let on_progress = |progress: ScanProgress| seen.borrow_mut().push(progress.processed);

        let result = scan_files(
            "test",
            FileSet::collect(&[dir.path().to_path_buf()], 1, |_| true),
            None,
            ParseOptions::default().with_limit(2).with_progress(&on_progress),
            decode_one,
        );

        assert_eq!(result.files_processed, 2);
        assert_eq!(seen.into_inner(), vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_root_is_not_an_error() {
        let set = FileSet::collect(&[PathBuf::from("/definitely/not/here")], 3, |_| true);
        assert!(set.files.is_empty());
        assert!(set.errors.is_empty());
    }

    #[test]
    fn test_document_checkpoint_is_ignored_for_file_sources() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.log", "good");
        let wrong_shape = SourceCheckpoint::Document(tokensync_types::DocumentCheckpoint {
            path: None,
            mtime: 1,
            size: 1,
            record_count: 1,
        });

        let result = scan_files(
            "test",
            FileSet::collect(&[dir.path().to_path_buf()], 1, |_| true),
            Some(&wrong_shape),
            ParseOptions::default(),
            decode_one,
        );
        assert!(!result.is_incremental);
        assert_eq!(result.files_processed, 1);
    }
}
