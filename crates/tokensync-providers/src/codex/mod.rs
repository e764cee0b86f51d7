mod io;
mod schema;

use std::path::PathBuf;
use tokensync_types::{IncrementalParseResult, ParseOptions, SourceCheckpoint};

use self::io::decode_codex_file;
use crate::incremental::{FileSet, scan_files};
use crate::paths::codex_roots;
use crate::traits::UsageParser;

/// Codex CLI: rollout transcripts under `sessions/YYYY/MM/DD/rollout-*.jsonl`.
pub struct CodexSource {
    roots: Vec<PathBuf>,
}

impl Default for CodexSource {
    fn default() -> Self {
        Self::new(codex_roots())
    }
}

impl CodexSource {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }
}

impl UsageParser for CodexSource {
    fn id(&self) -> &'static str {
        io::SOURCE
    }

    fn display_name(&self) -> &'static str {
        "Codex CLI"
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
        let files = FileSet::collect(&self.roots, 5, |path| {
            path.extension().is_some_and(|e| e == "jsonl")
        });
        scan_files(io::SOURCE, files, checkpoint, options, decode_codex_file)
    }
}
