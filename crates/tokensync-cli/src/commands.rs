use anyhow::Result;
use tokensync_runtime::Workspace;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Commands, LogLevel};
use crate::handlers;

/// Logs go to stderr so `--json` output on stdout stays parseable.
pub fn init_logging(level: Option<LogLevel>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level.to_string()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatch a parsed command line. Returns the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    let mut workspace = Workspace::resolve(cli.data_dir.as_deref())?;
    if let Some(api_url) = cli.api_url {
        workspace.config_mut().api_url = api_url;
    }

    match cli.command {
        Commands::Scan {
            source,
            json,
            verbose,
            top,
        } => handlers::scan::handle(&workspace, &source, json, verbose, top),

        Commands::Sync {
            source,
            dry_run,
            json,
            verbose,
        } => handlers::sync::handle(&workspace, &source, dry_run, json, verbose),

        Commands::Sources { json } => handlers::sources::handle(&workspace, json),
    }
}
