use serde::Serialize;
use tokensync_providers::UsageParser;
use tokensync_types::{ParseOptions, ScanProgress, UnitError, UsageStats};

/// Per-source result of a local scan.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceScan {
    pub source: String,
    pub display_name: String,
    pub exists: bool,
    pub records: usize,
    pub files_processed: usize,
    pub errors: Vec<UnitError>,
    pub stats: UsageStats,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub sources: Vec<SourceScan>,
    /// All sources merged
    pub stats: UsageStats,
}

impl ScanReport {
    pub fn error_count(&self) -> usize {
        self.sources.iter().map(|s| s.errors.len()).sum()
    }
}

/// Full local scan of every adapter. Reads no checkpoint and writes nothing.
pub struct ScanService<'a> {
    adapters: &'a [Box<dyn UsageParser>],
}

impl<'a> ScanService<'a> {
    pub fn new(adapters: &'a [Box<dyn UsageParser>]) -> Self {
        Self { adapters }
    }

    pub fn run(&self, on_progress: Option<&dyn Fn(ScanProgress)>) -> ScanReport {
        let mut report = ScanReport::default();

        for adapter in self.adapters {
            let mut scan = SourceScan {
                source: adapter.id().to_string(),
                display_name: adapter.display_name().to_string(),
                exists: adapter.exists(),
                records: 0,
                files_processed: 0,
                errors: Vec::new(),
                stats: UsageStats::default(),
            };

            if scan.exists {
                let mut options = ParseOptions::default();
                if let Some(callback) = on_progress {
                    options = options.with_progress(callback);
                }
                let result = adapter.parse(options);
                scan.records = result.records.len();
                scan.files_processed = result.files_processed;
                scan.errors = result.errors;
                scan.stats = result.stats;
                report.stats.merge(&scan.stats);
            }

            report.sources.push(scan);
        }

        report
    }
}
