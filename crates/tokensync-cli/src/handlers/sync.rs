use anyhow::Result;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use tokensync_runtime::{
    EnvCredentials, SourceOutcome, SourceReport, SyncClient, SyncOptions, SyncOutcome,
    SyncProgress, SyncReport, SyncService, Workspace,
};

pub fn handle(
    workspace: &Workspace,
    sources: &[String],
    dry_run: bool,
    json: bool,
    verbose: bool,
) -> Result<i32> {
    let config = workspace.config();
    let adapters = workspace.adapters(sources)?;
    let client = SyncClient::new(config.api_url.clone())?;
    let store = workspace.checkpoint_store();
    let credentials = EnvCredentials;
    let service = SyncService::new(&adapters, &client, &credentials, &store);
    let options = SyncOptions {
        dry_run,
        batch_size: config.batch_size,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(service.run(options, |progress| {
        if verbose {
            print_progress(&progress);
        }
    }))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, dry_run);
    }
    Ok(report.exit_code())
}

fn print_progress(progress: &SyncProgress) {
    match progress {
        SyncProgress::SourceMissing { source } => eprintln!("[{}] no data found", source),
        SyncProgress::SourceScanning { source } => eprintln!("[{}] scanning", source),
        SyncProgress::SourceScanned {
            source,
            records,
            files_processed,
            skipped_files,
            errors,
        } => eprintln!(
            "[{}] {} new record(s), {} file(s) read, {} unchanged, {} error(s)",
            source, records, files_processed, skipped_files, errors
        ),
        SyncProgress::BatchUploaded {
            source,
            batch,
            batches,
            messages_received,
            messages_synced,
        } => eprintln!(
            "[{}] batch {}/{}: {} received, {} new",
            source, batch, batches, messages_received, messages_synced
        ),
        SyncProgress::SourceFailed { source, error } => eprintln!("[{}] failed: {}", source, error),
        SyncProgress::Completed { .. } => {}
    }
}

fn describe(source: &SourceReport) -> String {
    match &source.outcome {
        SourceOutcome::Missing => "not installed".to_string(),
        SourceOutcome::UpToDate => "up to date".to_string(),
        SourceOutcome::DryRun { records } => format!("{} record(s) would be uploaded", records),
        SourceOutcome::Synced { received, synced } => {
            format!("{} record(s) sent, {} received, {} new", source.records, received, synced)
        }
        SourceOutcome::EndpointUnavailable => {
            "sync endpoint not available yet; will retry".to_string()
        }
        SourceOutcome::AuthRequired => "token rejected".to_string(),
        SourceOutcome::Failed { error, .. } => format!("failed: {}", error),
        SourceOutcome::NotAttempted => "skipped".to_string(),
    }
}

fn print_report(report: &SyncReport, dry_run: bool) {
    if report.outcome == SyncOutcome::AuthRequired && report.sources.is_empty() {
        eprintln!("Not authenticated: set TOKENSYNC_TOKEN to upload usage.");
        return;
    }

    for source in &report.sources {
        let suffix = if source.errors.is_empty() {
            String::new()
        } else {
            format!(" ({} unit(s) skipped)", source.errors.len())
        };
        println!("{:<12} {}{}", source.source, describe(source), suffix);
    }

    let (message, ok) = match report.outcome {
        SyncOutcome::Success if dry_run => ("Dry run complete; nothing was uploaded.", true),
        SyncOutcome::Success => ("Sync complete.", true),
        SyncOutcome::Partial => (
            "Sync partially complete; failed sources will be retried.",
            true,
        ),
        SyncOutcome::Failed => ("Sync failed.", false),
        SyncOutcome::AuthRequired => (
            "Authentication required: the sync token was rejected.",
            false,
        ),
    };
    if ok {
        if std::io::stdout().is_terminal() {
            println!("{}", message.green().bold());
        } else {
            println!("{}", message);
        }
    } else if std::io::stderr().is_terminal() {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
