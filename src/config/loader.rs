use std::env;
use std::path::Path;

use tokio::fs;
use tracing::{info, warn};

use crate::types::FilamentError;

use super::{paths, PluginSettings};

impl PluginSettings {
    /// Load settings from config.json in the app directory
    /// Falls back to defaults if the file doesn't exist or can't be parsed
    pub async fn load() -> Self {
        let config_path = match paths::get_config_path() {
            Ok(path) => path,
            Err(err) => {
                warn!(error = ?err, "Failed to locate config.json, using defaults");
                return Self::default().with_env_overrides();
            }
        };
        Self::load_from(&config_path).await.with_env_overrides()
    }

    /// Load settings from an explicit path, falling back to defaults.
    pub async fn load_from(path: &Path) -> Self {
        match Self::try_load(path).await {
            Ok(settings) => {
                info!(
                    base_url = %settings.base_url,
                    check_interval = settings.check_interval,
                    gpio_pin = settings.gpio_pin,
                    "Loaded plugin settings"
                );
                settings
            }
            Err(err) => {
                warn!(error = ?err, "Failed to load config.json, using defaults");
                Self::default()
            }
        }
    }

    async fn try_load(path: &Path) -> Result<Self, FilamentError> {
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .await
            .map_err(|err| FilamentError::Config(format!("Failed to read config file: {err}")))?;

        serde_json::from_str(&contents)
            .map_err(|err| FilamentError::Config(format!("Failed to parse config.json: {err}")))
    }

    /// Apply `OCTOFILAMENT_API_URL` / `OCTOFILAMENT_API_KEY` if set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("OCTOFILAMENT_API_URL") {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                self.base_url = trimmed.to_string();
            }
        }
        if let Ok(key) = env::var("OCTOFILAMENT_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key.trim().to_string());
            }
        }
        self
    }
}
