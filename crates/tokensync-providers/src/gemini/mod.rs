mod io;

use std::path::{Path, PathBuf};
use tokensync_types::{IncrementalParseResult, ParseOptions, SourceCheckpoint};

use self::io::decode_gemini_file;
use crate::incremental::{FileSet, scan_files};
use crate::paths::gemini_roots;
use crate::traits::UsageParser;

/// Gemini CLI: `<root>/<project-hash>/chats/session-*.json`
pub struct GeminiSource {
    roots: Vec<PathBuf>,
}

impl Default for GeminiSource {
    fn default() -> Self {
        Self::new(gemini_roots())
    }
}

impl GeminiSource {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

fn is_chat_file(path: &Path) -> bool {
    let in_chats = path
        .parent()
        .and_then(Path::file_name)
        .is_some_and(|name| name == "chats");
    let named_session = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("session-") && n.ends_with(".json"));
    in_chats && named_session
}

impl UsageParser for GeminiSource {
    fn id(&self) -> &'static str {
        io::SOURCE
    }

    fn display_name(&self) -> &'static str {
        "Gemini CLI"
    }

    fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn exists(&self) -> bool {
        self.roots.iter().any(|root| root.is_dir())
    }

    fn parse_incremental(
        &self,
        checkpoint: Option<&SourceCheckpoint>,
        options: ParseOptions<'_>,
    ) -> IncrementalParseResult {
        let files = FileSet::collect(&self.roots, 3, is_chat_file);
        scan_files(io::SOURCE, files, checkpoint, options, decode_gemini_file)
    }
}
