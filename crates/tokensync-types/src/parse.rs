use serde::Serialize;
use std::fmt;

use crate::checkpoint::SourceCheckpoint;
use crate::record::UsageRecord;
use crate::stats::UsageStats;

/// Progress notification emitted after each unit of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub source: &'static str,
    pub processed: usize,
    pub total: usize,
}

/// Options shared by full and incremental scans.
#[derive(Clone, Copy, Default)]
pub struct ParseOptions<'a> {
    /// Maximum number of units decoded in this call. Units past the limit are
    /// left out of the returned checkpoint so a later run picks them up.
    pub limit: Option<usize>,
    pub on_progress: Option<&'a dyn Fn(ScanProgress)>,
}

impl<'a> ParseOptions<'a> {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_progress(mut self, on_progress: &'a dyn Fn(ScanProgress)) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    pub fn report(&self, progress: ScanProgress) {
        if let Some(callback) = self.on_progress {
            callback(progress);
        }
    }
}

impl fmt::Debug for ParseOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("limit", &self.limit)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// A unit (line, file or array entry) that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitError {
    /// e.g. `/path/session.jsonl:17` or `/path/taskHistory.json[3]`
    pub unit: String,
    pub error: String,
}

impl UnitError {
    pub fn new(unit: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            unit: unit.into(),
            error: error.to_string(),
        }
    }
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.unit, self.error)
    }
}

/// Output of a full scan.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub records: Vec<UsageRecord>,
    pub stats: UsageStats,
    pub files_processed: usize,
    pub errors: Vec<UnitError>,
}

/// Output of an incremental scan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementalParseResult {
    pub records: Vec<UsageRecord>,
    pub stats: UsageStats,
    pub files_processed: usize,
    pub errors: Vec<UnitError>,
    /// Checkpoint describing everything decoded so far, to be committed
    /// once the records are safely delivered
    pub checkpoint: SourceCheckpoint,
    /// Whether a prior checkpoint was consulted
    pub is_incremental: bool,
    /// Units skipped because their fingerprint matched
    pub skipped_files: usize,
}

impl IncrementalParseResult {
    pub fn into_full(self) -> ParseResult {
        ParseResult {
            records: self.records,
            stats: self.stats,
            files_processed: self.files_processed,
            errors: self.errors,
        }
    }
}
