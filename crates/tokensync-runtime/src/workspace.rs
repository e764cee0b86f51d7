use std::path::{Path, PathBuf};
use tokensync_core::{checkpoint_path, config_path, resolve_workspace_path};
use tokensync_index::CheckpointStore;
use tokensync_providers::UsageParser;

use crate::Result;
use crate::config::Config;

/// A resolved data directory: `config.toml` plus the sync checkpoint.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Resolve the data directory (explicit, then `TOKENSYNC_PATH`, then the
    /// platform default) and load its configuration.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        let root = resolve_workspace_path(explicit)?;
        Self::open(root)
    }

    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = Config::load_from(&config_path(&root))?;
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn checkpoint_store(&self) -> CheckpointStore {
        CheckpointStore::new(checkpoint_path(&self.root))
    }

    pub fn adapters(&self, only: &[String]) -> Result<Vec<Box<dyn UsageParser>>> {
        self.config.adapters(only)
    }
}
