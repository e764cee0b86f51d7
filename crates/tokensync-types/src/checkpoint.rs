use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs::Metadata;

use crate::util::system_time_millis;

/// Current on-disk version of [`SyncCheckpoint`].
pub const CHECKPOINT_VERSION: u32 = 1;

/// Filesystem fingerprint of one scanned unit.
///
/// A unit counts as unchanged only when both fields match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFingerprint {
    /// Modification time in milliseconds since the Unix epoch
    pub mtime: u64,
    /// Size in bytes
    pub size: u64,
}

impl FileFingerprint {
    pub fn new(mtime: u64, size: u64) -> Self {
        Self { mtime, size }
    }

    /// Returns None when the platform cannot report a modification time.
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        let modified = metadata.modified().ok()?;
        Some(Self {
            mtime: system_time_millis(modified),
            size: metadata.len(),
        })
    }
}

/// Structural marker for sources stored as one growing array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentCheckpoint {
    /// Which candidate document was read (several editor installs may exist)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub mtime: u64,
    pub size: u64,
    /// Number of array entries already decoded
    pub record_count: usize,
}

impl DocumentCheckpoint {
    pub fn fingerprint(&self) -> FileFingerprint {
        FileFingerprint::new(self.mtime, self.size)
    }
}

/// Per-source cursor used to skip unchanged data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceCheckpoint {
    /// Single document with an entry count. Tried first when decoding: a file
    /// map never carries the top-level `mtime`/`size`/`recordCount` trio.
    Document(DocumentCheckpoint),
    /// File path -> fingerprint, for sources stored as many files
    Files(BTreeMap<String, FileFingerprint>),
}

impl SourceCheckpoint {
    pub fn empty_files() -> Self {
        SourceCheckpoint::Files(BTreeMap::new())
    }

    pub fn as_files(&self) -> Option<&BTreeMap<String, FileFingerprint>> {
        match self {
            SourceCheckpoint::Files(files) => Some(files),
            SourceCheckpoint::Document(_) => None,
        }
    }

    pub fn as_document(&self) -> Option<&DocumentCheckpoint> {
        match self {
            SourceCheckpoint::Document(doc) => Some(doc),
            SourceCheckpoint::Files(_) => None,
        }
    }
}

/// Top-level persisted checkpoint.
///
/// Unknown fields are ignored and source entries with an unrecognized shape
/// are dropped, so a file written by a newer client still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncCheckpoint {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub machine_id: String,
    #[serde(default, deserialize_with = "lenient_sources")]
    pub sources: BTreeMap<String, SourceCheckpoint>,
}

fn default_version() -> u32 {
    CHECKPOINT_VERSION
}

fn lenient_sources<'de, D>(deserializer: D) -> Result<BTreeMap<String, SourceCheckpoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, serde_json::Value> = BTreeMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, value)| {
            serde_json::from_value::<SourceCheckpoint>(value)
                .ok()
                .map(|checkpoint| (name, checkpoint))
        })
        .collect())
}

impl SyncCheckpoint {
    pub fn new(machine_id: impl Into<String>) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            machine_id: machine_id.into(),
            sources: BTreeMap::new(),
        }
    }

    pub fn source(&self, name: &str) -> Option<&SourceCheckpoint> {
        self.sources.get(name)
    }

    pub fn set_source(&mut self, name: impl Into<String>, checkpoint: SourceCheckpoint) {
        self.sources.insert(name.into(), checkpoint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_shape_roundtrip() {
        let json = r#"{"mtime": 1700000000000, "size": 512, "recordCount": 5}"#;
        let checkpoint: SourceCheckpoint = serde_json::from_str(json).unwrap();
        let doc = checkpoint.as_document().expect("document shape");
        assert_eq!(doc.record_count, 5);
        assert!(doc.path.is_none());
    }

    #[test]
    fn test_files_shape() {
        let json = r#"{"/tmp/a.jsonl": {"mtime": 1, "size": 2}}"#;
        let checkpoint: SourceCheckpoint = serde_json::from_str(json).unwrap();
        let files = checkpoint.as_files().expect("files shape");
        assert_eq!(files["/tmp/a.jsonl"], FileFingerprint::new(1, 2));
    }

    #[test]
    fn test_empty_map_is_files_shape() {
        let checkpoint: SourceCheckpoint = serde_json::from_str("{}").unwrap();
        assert_eq!(checkpoint, SourceCheckpoint::empty_files());
    }

    #[test]
    fn test_sync_checkpoint_tolerates_unknown_fields() {
        let json = r#"{
            "version": 3,
            "machineId": "m-1",
            "futureField": true,
            "sources": {
                "codex": {"/a.jsonl": {"mtime": 1, "size": 2}},
                "strange": [1, 2, 3]
            }
        }"#;
        let checkpoint: SyncCheckpoint = serde_json::from_str(json).unwrap();
        assert_eq!(checkpoint.version, 3);
        assert_eq!(checkpoint.machine_id, "m-1");
        assert!(checkpoint.source("codex").is_some());
        assert!(checkpoint.source("strange").is_none());
        assert!(checkpoint.source("cline").is_none());
    }
}
