use anyhow::Result;
use serde_json::json;
use tokensync_providers::get_all_providers;
use tokensync_runtime::Workspace;

pub fn handle(workspace: &Workspace, json: bool) -> Result<i32> {
    let config = workspace.config();
    let mut rows = Vec::new();
    for meta in get_all_providers() {
        let adapter = config.adapter(meta.name)?;
        rows.push((
            meta,
            config.source(meta.name).enabled,
            adapter.exists(),
            adapter.roots().to_vec(),
        ));
    }

    if json {
        let output: Vec<_> = rows
            .iter()
            .map(|(meta, enabled, exists, roots)| {
                json!({
                    "source": meta.name,
                    "name": meta.description,
                    "enabled": enabled,
                    "exists": exists,
                    "roots": roots,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(0);
    }

    println!("{:<12} {:<8} {:<7} LOCATION", "SOURCE", "ENABLED", "FOUND");
    println!("{}", "-".repeat(80));
    for (meta, enabled, exists, roots) in &rows {
        let location = roots
            .iter()
            .find(|r| r.exists())
            .or(roots.first())
            .map(|r| r.display().to_string())
            .unwrap_or_else(|| meta.default_log_path.to_string());
        println!(
            "{:<12} {:<8} {:<7} {}",
            meta.name,
            if *enabled { "yes" } else { "no" },
            if *exists { "yes" } else { "no" },
            location
        );
    }
    Ok(0)
}
