//! Grid configuration persistence
//!
//! Stores user preferences in `~/.config/gridcanvas/config.yaml`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::DEFAULT_COLUMN_WIDTH;
use crate::scroll::{ScrollStrategy, StrategyKind, DEFAULT_AUTO_THRESHOLD, DEFAULT_BUFFER};

/// Grid configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Selected theme id (e.g., "default-light", "default-dark")
    pub theme: String,
    pub striped: bool,
    pub strategy: StrategyKind,
    /// Off-screen rows painted on each side of the viewport
    pub buffer: usize,
    /// Row count at which the auto strategy turns adaptive
    pub auto_threshold: usize,
    pub default_column_width: f32,
    pub double_click_ms: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            theme: "default-light".to_string(),
            striped: true,
            strategy: StrategyKind::Auto,
            buffer: DEFAULT_BUFFER,
            auto_threshold: DEFAULT_AUTO_THRESHOLD,
            default_column_width: DEFAULT_COLUMN_WIDTH,
            double_click_ms: 300,
        }
    }
}

impl GridConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load from an explicit path; any failure yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("Config file not found at {}, using defaults", path.display());
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<GridConfig>(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config.sanitized()
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content =
            serde_yaml::to_string(self).map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Update theme and save
    pub fn set_theme(&mut self, theme_id: &str) -> Result<(), String> {
        self.theme = theme_id.to_string();
        self.save()
    }

    pub fn build_strategy(&self) -> Box<dyn ScrollStrategy> {
        self.strategy.build(self.buffer, self.auto_threshold)
    }

    pub fn double_click_interval(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }

    // Hand-edited files may carry nonsense widths
    fn sanitized(mut self) -> Self {
        if !self.default_column_width.is_finite() || self.default_column_width <= 0.0 {
            self.default_column_width = DEFAULT_COLUMN_WIDTH;
        }
        self
    }
}
