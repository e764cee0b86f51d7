use std::path::PathBuf;
use tokensync_types::{IncrementalParseResult, ParseOptions, ParseResult, SourceCheckpoint};

/// Uniform capability implemented by every source adapter.
///
/// Responsibilities:
/// - Know where the tool keeps its data (`roots`)
/// - Probe cheaply for presence (`exists`)
/// - Decode the tool's storage into usage records, optionally skipping
///   units a prior checkpoint marks as unchanged (`parse_incremental`)
///
/// Decode failures never escape an adapter: they are collected into the
/// result's `errors` list.
pub trait UsageParser: Send + Sync {
    /// Stable source identifier, used as checkpoint key and wire `source`
    fn id(&self) -> &'static str;

    /// Human readable tool name
    fn display_name(&self) -> &'static str;

    /// Locations this adapter reads from
    fn roots(&self) -> &[PathBuf];

    /// Existence/type checks only; never reads contents, never fails
    fn exists(&self) -> bool;

    /// Scan, consulting `checkpoint` to skip unchanged units
    fn parse_incremental(
        &self,
        checkpoint: Option<&SourceCheckpoint>,
        options: ParseOptions<'_>,
    ) -> IncrementalParseResult;

    /// Full scan. Same as an incremental scan without a checkpoint.
    fn parse(&self, options: ParseOptions<'_>) -> ParseResult {
        self.parse_incremental(None, options).into_full()
    }
}
