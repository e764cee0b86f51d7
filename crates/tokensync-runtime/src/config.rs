use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokensync_core::expand_tilde;
use tokensync_providers::{UsageParser, create_adapter, create_adapter_with_roots, get_all_providers};

use crate::{Error, Result};

pub const DEFAULT_API_URL: &str = "https://tokensync.dev";
pub const DEFAULT_BATCH_SIZE: usize = 5000;

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Replaces the adapter's default locations when non-empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            roots: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Records per upload request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub sources: BTreeMap<String, SourceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            batch_size: default_batch_size(),
            sources: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Missing file means defaults; a present but invalid file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        if config.batch_size == 0 {
            return Err(Error::Config("batch_size must be at least 1".to_string()));
        }
        Ok(config)
    }

    pub fn source(&self, name: &str) -> SourceConfig {
        self.sources.get(name).cloned().unwrap_or_default()
    }

    /// Adapter for one known source at its configured roots, enabled or not.
    pub fn adapter(&self, name: &str) -> Result<Box<dyn UsageParser>> {
        let source = self.source(name);
        let created = if source.roots.is_empty() {
            create_adapter(name)
        } else {
            let roots = source
                .roots
                .iter()
                .map(|root| expand_tilde(&root.to_string_lossy()))
                .collect();
            create_adapter_with_roots(name, roots)
        };
        created.map_err(|e| Error::Config(e.to_string()))
    }

    /// Build adapters for enabled sources in registry order. A non-empty
    /// `only` restricts the set and must name known sources.
    pub fn adapters(&self, only: &[String]) -> Result<Vec<Box<dyn UsageParser>>> {
        let known: Vec<&str> = get_all_providers().iter().map(|p| p.name).collect();
        if let Some(unknown) = only.iter().find(|name| !known.contains(&name.as_str())) {
            return Err(Error::Config(format!(
                "unknown source '{}' (expected one of: {})",
                unknown,
                known.join(", ")
            )));
        }

        let mut adapters = Vec::new();
        for name in known {
            if !only.is_empty() && !only.iter().any(|o| o == name) {
                continue;
            }
            if !self.source(name).enabled {
                continue;
            }
            adapters.push(self.adapter(name)?);
        }
        Ok(adapters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
api_url = "http://localhost:3000"

[sources.codex]
roots = ["/tmp/codex"]

[sources.gemini]
enabled = false
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert!(config.source("codex").enabled);
        assert!(!config.source("gemini").enabled);

        let adapters = config.adapters(&[]).unwrap();
        let ids: Vec<_> = adapters.iter().map(|a| a.id()).collect();
        assert!(!ids.contains(&"gemini"));
        let codex = adapters.iter().find(|a| a.id() == "codex").unwrap();
        assert_eq!(codex.roots(), &[PathBuf::from("/tmp/codex")]);
    }

    #[test]
    fn test_only_filters_and_validates() {
        let config = Config::default();
        let adapters = config.adapters(&["cline".to_string()]).unwrap();
        assert_eq!(adapters.len(), 1);
        assert_eq!(adapters[0].id(), "cline");

        assert!(matches!(
            config.adapters(&["nope".to_string()]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "batch_size = 0\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
