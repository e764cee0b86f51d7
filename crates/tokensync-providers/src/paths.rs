//! Default storage locations for each supported tool.
//!
//! The `*_from` variants take the environment value and home directory as
//! arguments so they can be tested without touching process state.

use std::env;
use std::path::{Path, PathBuf};
use tokensync_core::expand_tilde;

/// Editors whose `User/globalStorage` may hold extension state.
const EDITOR_DIRS: &[&str] = &["Code", "Code - Insiders", "Cursor", "Windsurf", "VSCodium"];

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

pub fn claude_roots() -> Vec<PathBuf> {
    claude_roots_from(
        non_empty_env("CLAUDE_CONFIG_DIR").as_deref(),
        dirs::home_dir().as_deref(),
    )
}

/// `CLAUDE_CONFIG_DIR` may list several directories separated by commas.
pub fn claude_roots_from(config_dir: Option<&str>, home: Option<&Path>) -> Vec<PathBuf> {
    if let Some(value) = config_dir {
        return value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|dir| expand_tilde(dir).join("projects"))
            .collect();
    }
    home.map(|home| {
        vec![
            home.join(".config").join("claude").join("projects"),
            home.join(".claude").join("projects"),
        ]
    })
    .unwrap_or_default()
}

pub fn codex_roots() -> Vec<PathBuf> {
    codex_roots_from(
        non_empty_env("CODEX_HOME").as_deref(),
        dirs::home_dir().as_deref(),
    )
}

pub fn codex_roots_from(codex_home: Option<&str>, home: Option<&Path>) -> Vec<PathBuf> {
    match (codex_home, home) {
        (Some(dir), _) => vec![expand_tilde(dir.trim()).join("sessions")],
        (None, Some(home)) => vec![home.join(".codex").join("sessions")],
        (None, None) => Vec::new(),
    }
}

pub fn gemini_roots() -> Vec<PathBuf> {
    dirs::home_dir()
        .map(|home| vec![home.join(".gemini").join("tmp")])
        .unwrap_or_default()
}

pub fn opencode_roots() -> Vec<PathBuf> {
    opencode_roots_from(
        non_empty_env("XDG_DATA_HOME").as_deref(),
        dirs::home_dir().as_deref(),
    )
}

pub fn opencode_roots_from(xdg_data_home: Option<&str>, home: Option<&Path>) -> Vec<PathBuf> {
    let data_home = match (xdg_data_home, home) {
        (Some(dir), _) => PathBuf::from(dir.trim()),
        (None, Some(home)) => home.join(".local").join("share"),
        (None, None) => return Vec::new(),
    };
    vec![data_home.join("opencode").join("storage")]
}

/// Candidate `taskHistory.json` locations for a VS Code extension, most
/// common editor first.
pub fn task_history_candidates(extension_dir: &str) -> Vec<PathBuf> {
    task_history_candidates_from(
        extension_dir,
        dirs::config_dir().as_deref(),
        dirs::home_dir().as_deref(),
    )
}

pub fn task_history_candidates_from(
    extension_dir: &str,
    config_dir: Option<&Path>,
    home: Option<&Path>,
) -> Vec<PathBuf> {
    let mut user_dirs: Vec<PathBuf> = config_dir
        .map(|config| {
            EDITOR_DIRS
                .iter()
                .map(|editor| config.join(editor).join("User"))
                .collect()
        })
        .unwrap_or_default();
    if let Some(home) = home {
        user_dirs.push(home.join(".vscode-server").join("data").join("User"));
    }

    user_dirs
        .into_iter()
        .map(|user| {
            user.join("globalStorage")
                .join(extension_dir)
                .join("state")
                .join("taskHistory.json")
        })
        .collect()
}
