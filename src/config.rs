use anyhow::{Context, Result, bail};
use colored::*;
use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use crate::shell::history::DEFAULT_HISTORY_LENGTH;

const CONFIG_FILE: &str = "shetland.toml";
const HISTORY_FILE: &str = ".shetland_hist";

#[derive(Debug, Deserialize, Default)]
pub struct ShetlandConfig {
    #[serde(default)]
    pub history: HistoryConfig,
    /// Extra extension → driver entries, e.g. `fgb = "FlatGeobuf"`
    #[serde(default)]
    pub drivers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryConfig {
    pub file: Option<PathBuf>,
    #[serde(default = "default_history_length")]
    pub length: usize,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file: None,
            length: DEFAULT_HISTORY_LENGTH,
            enabled: true,
        }
    }
}

fn default_history_length() -> usize {
    DEFAULT_HISTORY_LENGTH
}

fn default_enabled() -> bool {
    true
}

impl HistoryConfig {
    /// Configured file with `~/` expanded, else `~/.shetland_hist`.
    pub fn path(&self) -> Option<PathBuf> {
        let home = BaseDirs::new().map(|b| b.home_dir().to_path_buf());
        match &self.file {
            Some(p) => match (p.strip_prefix("~"), home) {
                (Ok(rest), Some(home)) => Some(home.join(rest)),
                _ => Some(p.clone()),
            },
            None => home.map(|h| h.join(HISTORY_FILE)),
        }
    }
}

/// Finds the config: the explicit path, else `./shetland.toml`, else the
/// user config directory. No file at all means defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<ShetlandConfig> {
    let candidate = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            Some(path.to_path_buf())
        }
        None => {
            let local = PathBuf::from(CONFIG_FILE);
            let user = ProjectDirs::from("", "", "shetland").map(|d| d.config_dir().join(CONFIG_FILE));
            std::iter::once(local).chain(user).find(|p| p.exists())
        }
    };

    let Some(path) = candidate else {
        return Ok(ShetlandConfig::default());
    };

    eprintln!("{} Loading configuration from: {}", "⚙".green(), path.display().to_string().bold());
    parse_config(&path)
}

fn parse_config(path: &Path) -> Result<ShetlandConfig> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ShetlandConfig = toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
    if config.history.length == 0 {
        bail!("Configuration Error: history.length must be at least 1");
    }
    Ok(config)
}
