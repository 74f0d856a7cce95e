use super::schema::HoistConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming a config file to use instead of the default locations.
pub const CONFIG_ENV: &str = "HOIST_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. $HOIST_CONFIG
    /// 2. ./hoist.yaml
    /// 3. ~/.hoist/config.yaml
    /// 4. Default configuration
    pub async fn load_default() -> Result<HoistConfig, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.trim().is_empty()
        {
            return Self::load_from(Path::new(&path)).await;
        }

        // Check current directory
        let local_config = PathBuf::from("./hoist.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        // Check home directory
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".hoist").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        debug!("No config file found; using defaults");
        Ok(HoistConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<HoistConfig, ConfigError> {
        debug!("Loading config from {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let config: HoistConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
