use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokensync_types::{CHECKPOINT_VERSION, SyncCheckpoint};
use tracing::{debug, warn};

use crate::Result;

/// The single persisted `SyncCheckpoint` file.
///
/// Reading is forgiving: anything short of a valid document means "no
/// checkpoint" and a full rescan. Writing goes through a sibling temp file
/// and a rename so a crash never leaves a half-written checkpoint.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Option<SyncCheckpoint> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no checkpoint yet");
                return None;
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "checkpoint unreadable, rescanning");
                return None;
            }
        };

        match serde_json::from_str::<SyncCheckpoint>(&text) {
            Ok(checkpoint) => {
                if checkpoint.version > CHECKPOINT_VERSION {
                    warn!(
                        version = checkpoint.version,
                        "checkpoint written by a newer client, reading what is understood"
                    );
                }
                Some(checkpoint)
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "checkpoint corrupt, rescanning");
                None
            }
        }
    }

    /// Persist atomically, always at the current version.
    pub fn save(&self, checkpoint: &SyncCheckpoint) -> Result<()> {
        let mut checkpoint = checkpoint.clone();
        checkpoint.version = CHECKPOINT_VERSION;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(&checkpoint)?;

        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&body)?;
            file.sync_all()?;
        }
        if let Err(err) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        debug!(path = %self.path.display(), sources = checkpoint.sources.len(), "checkpoint saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".tmp-{}", std::process::id()));
        self.path.with_file_name(name)
    }
}
