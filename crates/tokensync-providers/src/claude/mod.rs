mod io;
mod schema;

use std::path::PathBuf;
use tokensync_types::{IncrementalParseResult, ParseOptions, SourceCheckpoint};

use crate::incremental::{FileSet, scan_files};
use crate::paths::claude_roots;
use crate::traits::UsageParser;

use self::io::decode_claude_file;

/// Claude Code: one append-only JSONL transcript per session under
/// `<root>/<encoded-project>/<session>.jsonl` (subagent files one level deeper).
pub struct ClaudeSource {
    roots: Vec<PathBuf>,
}

impl Default for ClaudeSource {
    fn default() -> Self {
        Self::new(claude_roots())
    }
}

impl ClaudeSource {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl UsageParser for ClaudeSource {
    fn id(&self) -> &'static str {
        io::SOURCE
    }

    fn display_name(&self) -> &'static str {
        "Claude Code"
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
        let files = FileSet::collect(&self.roots, 4, |path| {
            path.extension().is_some_and(|e| e == "jsonl")
        });
        scan_files(io::SOURCE, files, checkpoint, options, decode_claude_file)
    }
}
