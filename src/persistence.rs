use crate::types::Config;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.json";

/// Loads and saves the page behavior config as JSON
pub struct ConfigStore {
    config_dir: PathBuf,
}

impl ConfigStore {
    /// Store rooted at the platform config directory
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from("", "", "ridepage")
            .context("Failed to determine config directory")?;

        Self::at(project_dirs.config_dir())
    }

    /// Store rooted at `dir`, created if missing
    pub fn at(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        Ok(ConfigStore {
            config_dir: dir.to_path_buf(),
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Load the config, writing defaults on first run
    pub fn load_config(&self) -> Result<Config> {
        let config_path = self.config_path();

        if !config_path.exists() {
            let config = Config::default();
            self.save_config(&config)?;
            return Ok(config);
        }

        load_config_file(&config_path)
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(self.config_path(), content).context("Failed to write config file")?;

        Ok(())
    }
}

/// Read a config file; unparsable content falls back to defaults
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: Config = serde_json::from_str(&content).unwrap_or_else(|e| {
        tracing::warn!("Failed to parse config file: {}. Using defaults.", e);
        Config::default()
    });

    Ok(config.sanitized())
}
