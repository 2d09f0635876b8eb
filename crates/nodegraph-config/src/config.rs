/// Application configuration: load, save, and sanitize.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "NODEGRAPH_CONFIG";

/// Platform names accepted by [`AppConfig::platform`].
pub const PLATFORM_NAMES: [&str; 3] = ["auto", "mac", "default"];

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Maximum number of undo steps kept per document.
    pub max_undo_steps: usize,
    /// Maximum number of redo steps kept per document.
    pub max_redo_steps: usize,
    /// Bursts starting within this many milliseconds of the last commit
    /// are folded into that commit.
    pub merge_threshold_ms: u64,
    pub key_repeat: KeyRepeatSettings,
    /// Shortcut layout: "auto" (detect), "mac", or "default".
    pub platform: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_undo_steps: 100,
            max_redo_steps: 100,
            merge_threshold_ms: 100,
            key_repeat: KeyRepeatSettings::default(),
            platform: "auto".to_string(),
        }
    }
}

/// Acceleration curve for a held undo/redo shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyRepeatSettings {
    /// Delay before the first repeat, in milliseconds.
    pub max_delay_ms: u64,
    /// Floor the delay saturates at, in milliseconds.
    pub min_delay_ms: u64,
    /// Number of repeats until the delay reaches `min_delay_ms`.
    pub repeats_to_min: u32,
}

impl Default for KeyRepeatSettings {
    fn default() -> Self {
        Self {
            max_delay_ms: 500,
            min_delay_ms: 30,
            repeats_to_min: 12,
        }
    }
}

impl AppConfig {
    /// Returns the config file path.
    ///
    /// Resolution order:
    /// 1. `NODEGRAPH_CONFIG` environment variable
    /// 2. `nodegraph/nodegraph.json` under the user's config directory
    /// 3. `nodegraph.json` in the working directory
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .map(|d| d.join("nodegraph").join("nodegraph.json"))
            .unwrap_or_else(|| PathBuf::from("nodegraph.json"))
    }

    /// Loads config from `path`, creating a default file if it doesn't exist.
    /// Returns defaults on any error (missing file, parse error, etc.).
    pub fn load_or_create(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(contents) => match serde_json::from_str::<AppConfig>(&contents) {
                    Ok(mut config) => {
                        config.sanitize();
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {}: {e}", path.display());
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {}: {e}", path.display());
                }
            }
            // Don't overwrite a broken file
            Self::default()
        } else {
            let config = Self::default();
            if let Err(e) = config.save(path) {
                tracing::warn!("Failed to create default config at {}: {e}", path.display());
            }
            config
        }
    }

    /// Saves config to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Clamps values to valid ranges and resets invalid fields.
    pub fn sanitize(&mut self) {
        let repeat = &mut self.key_repeat;
        repeat.repeats_to_min = repeat.repeats_to_min.max(1);
        repeat.min_delay_ms = repeat.min_delay_ms.min(repeat.max_delay_ms);

        self.platform = self.platform.to_lowercase();
        if !PLATFORM_NAMES.contains(&self.platform.as_str()) {
            self.platform = "auto".to_string();
        }
    }
}
