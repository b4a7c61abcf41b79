//! Application configuration management

use std::path::{Path, PathBuf};

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Override for the key-value store file
    pub storage_path: Option<PathBuf>,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// UI settings
    pub ui: UiConfig,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Initial window width
    pub window_width: f32,
    /// Initial window height
    pub window_height: f32,
    /// Font with Thai glyphs, used where the bundled fonts have none
    pub font_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            log_level: "info".to_string(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            window_width: 960.0,
            window_height: 720.0,
            font_path: None,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "bioapp", "BioApp")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the default location. A first run writes the
    /// defaults out so they can be edited.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !path.exists() {
            let config = Self::default();
            if let Err(e) = config.save_to(&path) {
                tracing::warn!("Could not write default config: {}", e);
            }
            return Ok(config);
        }
        Self::load_from(&path)
    }

    /// Load configuration from `path`, defaults when the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Where the key-value store lives
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage_path.clone().or_else(crate::core::storage::FileStore::default_path)
    }

    /// Whether the dark theme is selected
    pub fn dark_theme(&self) -> bool {
        self.ui.theme.eq_ignore_ascii_case("dark")
    }
}
