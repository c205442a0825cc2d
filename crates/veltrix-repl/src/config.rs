//! REPL configuration: `$XDG_CONFIG_HOME/veltrix/config.toml`, then flags.
//!
//! ```toml
//! data_dir = "/tmp/veltrix"   # slots, preview.html, history
//! transient = false           # keep the tree in memory only
//! debounce_ms = 650
//! max_state_bytes = 5242880
//! login = true                # sign in on start
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use veltrix_kernel::store::paths;
use veltrix_kernel::{FileSlot, MemorySlot, PlaygroundConfig, Slot};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReplConfig {
    pub data_dir: Option<PathBuf>,
    pub transient: bool,
    pub debounce_ms: Option<u64>,
    pub max_state_bytes: Option<usize>,
    pub login: bool,
}

impl ReplConfig {
    /// Load from the XDG config file. A missing file means defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_dir().join("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// A throwaway config rooted at `dir`, for tests and demos.
    pub fn transient_in(dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(dir.into()),
            transient: true,
            ..Self::default()
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(paths::data_dir)
    }

    pub fn preview_path(&self) -> PathBuf {
        paths::preview_path(&self.data_dir())
    }

    pub fn history_path(&self) -> PathBuf {
        paths::history_path(&self.data_dir())
    }

    pub fn playground_config(&self) -> PlaygroundConfig {
        let mut config = if self.transient {
            PlaygroundConfig::transient()
        } else {
            PlaygroundConfig::default()
        };
        if let Some(ms) = self.debounce_ms {
            config = config.with_debounce(Duration::from_millis(ms));
        }
        if let Some(limit) = self.max_state_bytes {
            config = config.with_max_state_bytes(limit);
        }
        config
    }

    /// The slot the session persists into.
    pub fn slot(&self) -> Arc<dyn Slot> {
        if self.transient {
            Arc::new(MemorySlot::new())
        } else {
            Arc::new(FileSlot::in_data_dir(&self.data_dir()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(ReplConfig::parse("").unwrap(), ReplConfig::default());
    }

    #[test]
    fn fields_are_read() {
        let config = ReplConfig::parse(
            r#"
            data_dir = "/tmp/v"
            transient = true
            debounce_ms = 100
            login = true
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/v"));
        assert_eq!(config.preview_path(), PathBuf::from("/tmp/v/preview.html"));
        assert_eq!(config.history_path(), PathBuf::from("/tmp/v/history.txt"));
        let playground = config.playground_config();
        assert_eq!(playground.debounce, Duration::from_millis(100));
        assert_eq!(playground.storage_key, PlaygroundConfig::transient().storage_key);
        assert!(config.login);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(ReplConfig::parse("colour = true").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ReplConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, ReplConfig::default());
    }
}
