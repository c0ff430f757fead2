//! ignite-narrate configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrateConfig {
    /// Voice the narration scripts request from the speech provider
    #[serde(default)]
    pub voice_id: Option<String>,

    /// Speech model the narration scripts request
    #[serde(default)]
    pub model_id: Option<String>,

    /// Pretty-print JSON output
    #[serde(default = "default_pretty")]
    pub pretty: bool,

    /// File extensions treated as lesson content when preparing a directory
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_pretty() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    vec!["html".to_string(), "htm".to_string()]
}

impl Default for NarrateConfig {
    fn default() -> Self {
        Self {
            voice_id: None,
            model_id: None,
            pretty: default_pretty(),
            extensions: default_extensions(),
        }
    }
}

impl NarrateConfig {
    /// Get the config file path: ~/.config/ignite/narrate.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .context("Could not determine home directory")?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("ignite")
            .join("narrate.toml"))
    }

    /// Load config from the default location, returning defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: NarrateConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
