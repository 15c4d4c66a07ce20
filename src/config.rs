use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

/// Where the relay listens unless the config or environment says
/// otherwise.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub server_url: Option<String>,
    pub backend: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Remember the last selected backend so the next session starts
    /// on it.
    pub fn save_backend(backend: &str) -> Result<()> {
        let mut config = Self::load().unwrap_or_default();
        config.backend = Some(backend.to_string());
        config.save()
    }

    /// Relay base URL: the DUOCHAT_SERVER environment variable wins,
    /// then the config file, then the compiled-in default.
    pub fn server_url(&self) -> String {
        std::env::var("DUOCHAT_SERVER")
            .ok()
            .or_else(|| self.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("duochat").join("config.json"))
    }
}
