use std::path::{Path, PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Config(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// Environment variable overriding the workspace directory
pub const WORKSPACE_ENV: &str = "TOKENSYNC_PATH";

const CONFIG_FILE: &str = "config.toml";
const CHECKPOINT_FILE: &str = "sync-checkpoint.json";

/// Resolve the workspace data directory path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. TOKENSYNC_PATH environment variable (with tilde expansion)
/// 3. System data directory (recommended default)
/// 4. ~/.tokensync (fallback for systems without standard data directory)
pub fn resolve_workspace_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    let env_path = std::env::var(WORKSPACE_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty());
    resolve_workspace_path_from(
        explicit_path,
        env_path.as_deref(),
        dirs::data_dir(),
        dirs::home_dir(),
    )
}

/// Same resolution order with every input passed in.
pub fn resolve_workspace_path_from(
    explicit_path: Option<&str>,
    env_path: Option<&str>,
    data_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = explicit_path.or(env_path) {
        return Ok(expand_tilde(path));
    }
    if let Some(data_dir) = data_dir {
        return Ok(data_dir.join("tokensync"));
    }
    if let Some(home) = home_dir {
        return Ok(home.join(".tokensync"));
    }
    Err(Error::Config(
        "Could not determine workspace path: no HOME directory or system data directory found"
            .to_string(),
    ))
}

/// Expand tilde (~) in paths to the user's home directory
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(path)
}

pub fn config_path(workspace: &Path) -> PathBuf {
    workspace.join(CONFIG_FILE)
}

pub fn checkpoint_path(workspace: &Path) -> PathBuf {
    workspace.join(CHECKPOINT_FILE)
}
