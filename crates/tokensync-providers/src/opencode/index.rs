use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::builder::file_stem;
use crate::fields::{find_str, find_timestamp};

/// Metadata OpenCode keeps in session documents rather than on messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SessionInfo {
    pub directory: Option<String>,
    pub created: Option<String>,
}

/// `session/<projectID>/<sessionID>.json` documents keyed by session id.
#[derive(Debug, Default)]
pub(crate) struct SessionIndex {
    sessions: HashMap<String, SessionInfo>,
}

impl SessionIndex {
    /// Best effort: unreadable index documents only cost metadata.
    pub fn load(roots: &[PathBuf]) -> Self {
        let mut sessions = HashMap::new();
        for dir in roots.iter().map(|root| root.join("session")) {
            if !dir.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&dir).max_depth(3).into_iter().flatten() {
                let path = entry.path();
                if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != "json") {
                    continue;
                }
                match read_session(path) {
                    Some((id, info)) => {
                        sessions.insert(id, info);
                    }
                    None => debug!(file = %path.display(), "ignoring unreadable session document"),
                }
            }
        }
        Self { sessions }
    }

    pub fn get(&self, session_id: &str) -> Option<&SessionInfo> {
        self.sessions.get(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
}

fn read_session(path: &Path) -> Option<(String, SessionInfo)> {
    let text = std::fs::read_to_string(path).ok()?;
    let doc: Value = serde_json::from_str(&text).ok()?;
    if !doc.is_object() {
        return None;
    }
    let id = find_str(&doc, &[&["id"]])
        .map(str::to_string)
        .unwrap_or_else(|| file_stem(path));
    let info = SessionInfo {
        directory: find_str(&doc, &[&["directory"]]).map(str::to_string),
        created: find_timestamp(&doc, &[&["time", "created"]]),
    };
    Some((id, info))
}
