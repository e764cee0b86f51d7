use anyhow::Result;
use serde_json::json;
use tokensync_engine::{daily_series, top_models};
use tokensync_runtime::{ScanReport, ScanService, Workspace};

use super::format_count;

pub fn handle(
    workspace: &Workspace,
    sources: &[String],
    json: bool,
    verbose: bool,
    top: usize,
) -> Result<i32> {
    let adapters = workspace.adapters(sources)?;
    let report = ScanService::new(&adapters).run(None);

    if json {
        let output = json!({
            "sources": report.sources,
            "stats": report.stats,
            "topModels": top_models(&report.stats, top),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&report, verbose, top);
    }
    Ok(0)
}

fn print_report(report: &ScanReport, verbose: bool, top: usize) {
    println!(
        "{:<12} {:>9} {:>7} {:>7} {:>15}",
        "SOURCE", "RECORDS", "FILES", "ERRORS", "TOKENS"
    );
    for scan in &report.sources {
        if !scan.exists {
            println!("{:<12} {:>9}", scan.source, "-");
            continue;
        }
        println!(
            "{:<12} {:>9} {:>7} {:>7} {:>15}",
            scan.source,
            format_count(scan.records as u64),
            scan.files_processed,
            scan.errors.len(),
            format_count(scan.stats.total_tokens())
        );
        if verbose {
            for error in &scan.errors {
                println!("    {}", error);
            }
        }
    }

    let stats = &report.stats;
    println!();
    println!(
        "Total: {} messages, {} tokens (input {}, output {}, cache write {}, cache read {})",
        format_count(stats.message_count()),
        format_count(stats.total_tokens()),
        format_count(stats.totals.input_tokens),
        format_count(stats.totals.output_tokens),
        format_count(stats.totals.cache_creation_tokens),
        format_count(stats.totals.cache_read_tokens),
    );

    let models = top_models(stats, top);
    if !models.is_empty() {
        println!();
        println!("Top models:");
        for share in models {
            println!(
                "  {:<32} {:>15} {:>6.1}%",
                share.model,
                format_count(share.total_tokens),
                share.percent
            );
        }
    }

    let days = daily_series(stats);
    if !days.is_empty() {
        println!();
        println!("{:<12} {:>15} {:>9} {:>9}", "DATE", "TOKENS", "MESSAGES", "SESSIONS");
        for (date, day) in days {
            println!(
                "{:<12} {:>15} {:>9} {:>9}",
                date,
                format_count(day.totals.total()),
                day.message_count,
                day.session_count
            );
        }
    }

    if report.error_count() > 0 && !verbose {
        eprintln!(
            "{} unit(s) could not be decoded; rerun with --verbose for details",
            report.error_count()
        );
    }
}
