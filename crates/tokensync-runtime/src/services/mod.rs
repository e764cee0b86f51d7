pub mod scan;
pub mod sync;

pub use scan::{ScanReport, ScanService, SourceScan};
pub use sync::{
    SourceOutcome, SourceReport, SyncOptions, SyncOutcome, SyncProgress, SyncReport, SyncService,
};
