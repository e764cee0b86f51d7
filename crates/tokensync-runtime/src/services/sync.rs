use serde::Serialize;
use tokensync_core::machine_id;
use tokensync_index::CheckpointStore;
use tokensync_providers::UsageParser;
use tokensync_types::{ParseOptions, SyncCheckpoint, UnitError, UsageRecord, now_timestamp};
use tracing::{info, warn};

use crate::Result;
use crate::client::{SyncClient, SyncError, SyncRequest};
use crate::config::DEFAULT_BATCH_SIZE;
use crate::credentials::CredentialProvider;

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Scan and report without uploading or touching the checkpoint
    pub dry_run: bool,
    pub batch_size: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub enum SyncProgress {
    SourceMissing {
        source: String,
    },
    SourceScanning {
        source: String,
    },
    SourceScanned {
        source: String,
        records: usize,
        files_processed: usize,
        skipped_files: usize,
        errors: usize,
    },
    BatchUploaded {
        source: String,
        batch: usize,
        batches: usize,
        messages_received: u64,
        messages_synced: u64,
    },
    SourceFailed {
        source: String,
        error: String,
    },
    Completed {
        outcome: SyncOutcome,
    },
}

/// What happened to one source during a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    /// `exists()` was false
    Missing,
    /// Nothing new since the last checkpoint
    UpToDate,
    DryRun { records: usize },
    Synced { received: u64, synced: u64 },
    /// Server has no sync endpoint yet; retried next run
    EndpointUnavailable,
    AuthRequired,
    Failed { error: String, transport: bool },
    /// Not attempted because credentials were rejected earlier in the run
    NotAttempted,
}

impl SourceOutcome {
    fn is_success(&self) -> bool {
        matches!(
            self,
            SourceOutcome::UpToDate | SourceOutcome::DryRun { .. } | SourceOutcome::Synced { .. }
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    pub source: String,
    pub records: usize,
    pub errors: Vec<UnitError>,
    pub outcome: SourceOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Success,
    /// Some sources failed, others were delivered
    Partial,
    Failed,
    /// A token was rejected (HTTP 401). The run stops at that source and every
    /// later source is reported as `NotAttempted`, since they share the credential.
    AuthRequired,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub machine_id: String,
    pub sources: Vec<SourceReport>,
    pub outcome: SyncOutcome,
    pub checkpoint_saved: bool,
}

impl SyncReport {
    /// Process exit code: partial delivery still counts as success.
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            SyncOutcome::Success | SyncOutcome::Partial => 0,
            SyncOutcome::Failed | SyncOutcome::AuthRequired => 1,
        }
    }

    pub fn source(&self, name: &str) -> Option<&SourceReport> {
        self.sources.iter().find(|s| s.source == name)
    }
}

fn overall_outcome(sources: &[SourceReport]) -> SyncOutcome {
    if sources.iter().any(|s| s.outcome == SourceOutcome::AuthRequired) {
        return SyncOutcome::AuthRequired;
    }
    let failures: Vec<&SourceOutcome> = sources
        .iter()
        .map(|s| &s.outcome)
        .filter(|o| matches!(o, SourceOutcome::Failed { .. }))
        .collect();
    if failures.is_empty() {
        return SyncOutcome::Success;
    }
    let any_transport = failures
        .iter()
        .any(|o| matches!(o, SourceOutcome::Failed { transport: true, .. }));
    let any_success = sources.iter().any(|s| s.outcome.is_success());
    if any_success && !any_transport {
        SyncOutcome::Partial
    } else {
        SyncOutcome::Failed
    }
}

/// Scans each source incrementally, uploads what is new and commits
/// checkpoints only for sources whose upload succeeded.
///
/// Sources run strictly one after another; the only awaits are the HTTP
/// calls.
pub struct SyncService<'a> {
    adapters: &'a [Box<dyn UsageParser>],
    client: &'a SyncClient,
    credentials: &'a dyn CredentialProvider,
    store: &'a CheckpointStore,
}

impl<'a> SyncService<'a> {
    pub fn new(
        adapters: &'a [Box<dyn UsageParser>],
        client: &'a SyncClient,
        credentials: &'a dyn CredentialProvider,
        store: &'a CheckpointStore,
    ) -> Self {
        Self {
            adapters,
            client,
            credentials,
            store,
        }
    }

    pub async fn run<F>(&self, options: SyncOptions, mut on_progress: F) -> Result<SyncReport>
    where
        F: FnMut(SyncProgress),
    {
        let stored = self.store.load();
        let machine_id = machine_id(
            stored
                .as_ref()
                .map(|c| c.machine_id.as_str())
                .filter(|id| !id.is_empty()),
        );

        let token = match self.credentials.credentials() {
            Some(credentials) => Some(credentials.token),
            None if options.dry_run => None,
            None => {
                warn!("no credentials available, sync skipped");
                let report = SyncReport {
                    machine_id,
                    sources: Vec::new(),
                    outcome: SyncOutcome::AuthRequired,
                    checkpoint_saved: false,
                };
                on_progress(SyncProgress::Completed {
                    outcome: report.outcome,
                });
                return Ok(report);
            }
        };

        let mut next = stored
            .clone()
            .unwrap_or_else(|| SyncCheckpoint::new(machine_id.clone()));
        next.machine_id = machine_id.clone();

        let mut reports = Vec::with_capacity(self.adapters.len());
        let mut credentials_rejected = false;

        for adapter in self.adapters {
            let source = adapter.id();
            let mut report = SourceReport {
                source: source.to_string(),
                records: 0,
                errors: Vec::new(),
                outcome: SourceOutcome::NotAttempted,
            };

            if credentials_rejected {
                reports.push(report);
                continue;
            }

            if !adapter.exists() {
                on_progress(SyncProgress::SourceMissing {
                    source: source.to_string(),
                });
                report.outcome = SourceOutcome::Missing;
                reports.push(report);
                continue;
            }

            on_progress(SyncProgress::SourceScanning {
                source: source.to_string(),
            });
            let previous = stored.as_ref().and_then(|c| c.source(source));
            let result = adapter.parse_incremental(previous, ParseOptions::default());
            on_progress(SyncProgress::SourceScanned {
                source: source.to_string(),
                records: result.records.len(),
                files_processed: result.files_processed,
                skipped_files: result.skipped_files,
                errors: result.errors.len(),
            });
            report.records = result.records.len();
            report.errors = result.errors;

            let token = match (&token, options.dry_run) {
                (Some(token), false) => token.as_str(),
                _ => {
                    report.outcome = SourceOutcome::DryRun {
                        records: report.records,
                    };
                    reports.push(report);
                    continue;
                }
            };

            if result.records.is_empty() {
                next.set_source(source, result.checkpoint);
                report.outcome = SourceOutcome::UpToDate;
                reports.push(report);
                continue;
            }

            report.outcome = match self
                .upload(source, &machine_id, token, &result.records, options.batch_size, &mut on_progress)
                .await
            {
                Ok((received, synced)) => {
                    info!(source, received, synced, "source synced");
                    next.set_source(source, result.checkpoint);
                    SourceOutcome::Synced { received, synced }
                }
                Err(SyncError::AuthRequired) => {
                    credentials_rejected = true;
                    on_progress(SyncProgress::SourceFailed {
                        source: source.to_string(),
                        error: SyncError::AuthRequired.to_string(),
                    });
                    SourceOutcome::AuthRequired
                }
                Err(SyncError::EndpointUnavailable) => {
                    warn!(source, "sync endpoint unavailable, will retry next run");
                    SourceOutcome::EndpointUnavailable
                }
                Err(err) => {
                    warn!(source, error = %err, "source upload failed");
                    on_progress(SyncProgress::SourceFailed {
                        source: source.to_string(),
                        error: err.to_string(),
                    });
                    SourceOutcome::Failed {
                        error: err.to_string(),
                        transport: err.is_transport(),
                    }
                }
            };
            reports.push(report);
        }

        let mut checkpoint_saved = false;
        if !options.dry_run && stored.as_ref() != Some(&next) {
            self.store.save(&next)?;
            checkpoint_saved = true;
        }

        let outcome = overall_outcome(&reports);
        on_progress(SyncProgress::Completed { outcome });
        Ok(SyncReport {
            machine_id,
            sources: reports,
            outcome,
            checkpoint_saved,
        })
    }

    /// Upload in batches; the source succeeds only if every batch does.
    async fn upload<F>(
        &self,
        source: &str,
        machine_id: &str,
        token: &str,
        records: &[UsageRecord],
        batch_size: usize,
        on_progress: &mut F,
    ) -> std::result::Result<(u64, u64), SyncError>
    where
        F: FnMut(SyncProgress),
    {
        let synced_at = now_timestamp();
        let batches: Vec<&[UsageRecord]> = records.chunks(batch_size.max(1)).collect();
        let mut received = 0;
        let mut synced = 0;

        for (index, batch) in batches.iter().enumerate() {
            let request = SyncRequest::new(machine_id, source, &synced_at, batch);
            let response = self.client.sync(token, &request).await?;
            received += response.messages_received;
            synced += response.messages_synced;
            on_progress(SyncProgress::BatchUploaded {
                source: source.to_string(),
                batch: index + 1,
                batches: batches.len(),
                messages_received: response.messages_received,
                messages_synced: response.messages_synced,
            });
        }
        Ok((received, synced))
    }
}
