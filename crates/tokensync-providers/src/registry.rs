use anyhow::{Result, anyhow};
use std::path::PathBuf;

use crate::claude::ClaudeSource;
use crate::codex::CodexSource;
use crate::gemini::GeminiSource;
use crate::opencode::OpenCodeSource;
use crate::task_history::{CLINE, KILO_CODE, ROO_CODE, TaskHistorySource};
use crate::traits::UsageParser;

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: &'static str,
    pub description: &'static str,
    pub default_log_path: &'static str,
}

const PROVIDERS: &[ProviderMetadata] = &[
    ProviderMetadata {
        name: "claude_code",
        description: "Claude Code",
        default_log_path: "~/.claude/projects",
    },
    ProviderMetadata {
        name: "codex",
        description: "Codex CLI",
        default_log_path: "~/.codex/sessions",
    },
    ProviderMetadata {
        name: "gemini",
        description: "Gemini CLI",
        default_log_path: "~/.gemini/tmp",
    },
    ProviderMetadata {
        name: "opencode",
        description: "OpenCode",
        default_log_path: "~/.local/share/opencode/storage",
    },
    ProviderMetadata {
        name: "cline",
        description: "Cline (VS Code extension)",
        default_log_path: "<editor>/globalStorage/saoudrizwan.claude-dev/state/taskHistory.json",
    },
    ProviderMetadata {
        name: "roo_code",
        description: "Roo Code (VS Code extension)",
        default_log_path: "<editor>/globalStorage/rooveterinaryinc.roo-cline/state/taskHistory.json",
    },
    ProviderMetadata {
        name: "kilo_code",
        description: "Kilo Code (VS Code extension)",
        default_log_path: "<editor>/globalStorage/kilocode.kilo-code/state/taskHistory.json",
    },
];

pub fn get_all_providers() -> &'static [ProviderMetadata] {
    PROVIDERS
}

pub fn get_provider_metadata(name: &str) -> Option<&'static ProviderMetadata> {
    PROVIDERS.iter().find(|p| p.name == name)
}

/// Create an adapter reading from its default locations.
pub fn create_adapter(name: &str) -> Result<Box<dyn UsageParser>> {
    let adapter: Box<dyn UsageParser> = match name {
        "claude_code" => Box::new(ClaudeSource::default()),
        "codex" => Box::new(CodexSource::default()),
        "gemini" => Box::new(GeminiSource::default()),
        "opencode" => Box::new(OpenCodeSource::default()),
        "cline" => Box::new(TaskHistorySource::new(&CLINE)),
        "roo_code" => Box::new(TaskHistorySource::new(&ROO_CODE)),
        "kilo_code" => Box::new(TaskHistorySource::new(&KILO_CODE)),
        _ => return Err(anyhow!("Unknown source: {}", name)),
    };
    Ok(adapter)
}

/// Create an adapter reading from explicit locations. For task-history
/// sources the roots are `taskHistory.json` candidates.
pub fn create_adapter_with_roots(name: &str, roots: Vec<PathBuf>) -> Result<Box<dyn UsageParser>> {
    let adapter: Box<dyn UsageParser> = match name {
        "claude_code" => Box::new(ClaudeSource::new(roots)),
        "codex" => Box::new(CodexSource::new(roots)),
        "gemini" => Box::new(GeminiSource::new(roots)),
        "opencode" => Box::new(OpenCodeSource::new(roots)),
        "cline" => Box::new(TaskHistorySource::with_candidates(&CLINE, roots)),
        "roo_code" => Box::new(TaskHistorySource::with_candidates(&ROO_CODE, roots)),
        "kilo_code" => Box::new(TaskHistorySource::with_candidates(&KILO_CODE, roots)),
        _ => return Err(anyhow!("Unknown source: {}", name)),
    };
    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_provider_constructs_with_matching_id() {
        for meta in get_all_providers() {
            let adapter = create_adapter_with_roots(meta.name, vec![PathBuf::from("/nowhere")]).unwrap();
            assert_eq!(adapter.id(), meta.name);
            assert!(!adapter.exists());
        }
    }

    #[test]
    fn test_unknown_provider() {
        assert!(create_adapter("cursor").is_err());
        assert!(get_provider_metadata("cursor").is_none());
    }
}
