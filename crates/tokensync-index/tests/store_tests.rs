use std::collections::BTreeMap;
use tempfile::TempDir;
use tokensync_index::CheckpointStore;
use tokensync_types::{DocumentCheckpoint, FileFingerprint, SourceCheckpoint, SyncCheckpoint};

fn sample() -> SyncCheckpoint {
    let mut checkpoint = SyncCheckpoint::new("machine-1");
    let mut files = BTreeMap::new();
    files.insert("/a/b.jsonl".to_string(), FileFingerprint::new(1_700_000_000_000, 42));
    checkpoint.set_source("claude_code", SourceCheckpoint::Files(files));
    checkpoint.set_source(
        "cline",
        SourceCheckpoint::Document(DocumentCheckpoint {
            path: Some("/x/taskHistory.json".to_string()),
            mtime: 5,
            size: 10,
            record_count: 3,
        }),
    );
    checkpoint
}

#[test]
fn test_missing_file_is_no_checkpoint() {
    let dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(dir.path().join("sync-checkpoint.json"));
    assert!(store.load().is_none());
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let store = CheckpointStore::new(dir.path().join("nested/sync-checkpoint.json"));
    let checkpoint = sample();

    store.save(&checkpoint).unwrap();
    assert_eq!(store.load(), Some(checkpoint));

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_corrupt_file_is_no_checkpoint() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sync-checkpoint.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(CheckpointStore::new(path).load().is_none());
}

#[test]
fn test_newer_version_and_unknown_fields_tolerated() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sync-checkpoint.json");
    std::fs::write(
        &path,
        r#"{
            "version": 7,
            "machineId": "m",
            "futureField": true,
            "sources": {
                "codex": {"/s/r.jsonl": {"mtime": 1, "size": 2}},
                "cline": {"mtime": 1, "size": 2, "recordCount": 4},
                "mystery": 12
            }
        }"#,
    )
    .unwrap();

    let store = CheckpointStore::new(&path);
    let checkpoint = store.load().unwrap();
    assert_eq!(checkpoint.version, 7);
    assert_eq!(checkpoint.sources.len(), 2);
    assert_eq!(
        checkpoint.source("cline").and_then(|s| s.as_document()).map(|d| d.record_count),
        Some(4)
    );

    store.save(&checkpoint).unwrap();
    assert_eq!(store.load().unwrap().version, 1);
}
