//! Configuration loader for gptbot.
//!
//! Reads `config.toml` from the data directory (`~/.gptbot/` by default) and
//! deserializes it into [`GptbotConfig`]. The API credential never lives in
//! the file; only the name of the environment variable holding it does.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use gptbot_types::config::GptbotConfig;
use gptbot_types::error::ConfigError;

use crate::sqlite::pool::default_database_path;

pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the data directory.
///
/// Priority: `GPTBOT_DATA_DIR` env var, then `~/.gptbot`, then `./.gptbot`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GPTBOT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".gptbot");
    }

    PathBuf::from(".gptbot")
}

/// Read and parse the config file at `path`.
///
/// A missing file yields [`GptbotConfig::default()`]; any other read or
/// parse failure is returned.
pub async fn read_config(path: &Path) -> Result<GptbotConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(GptbotConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    toml::from_str::<GptbotConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns the defaults.
/// - If the file cannot be read or parsed, logs a warning and returns the defaults.
pub async fn load_config(data_dir: &Path) -> GptbotConfig {
    match read_config(&data_dir.join(CONFIG_FILE)).await {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("{err}, using defaults");
            GptbotConfig::default()
        }
    }
}

/// Database file for `config`: the configured path, else the default file
/// inside `data_dir`. Relative configured paths are resolved against `data_dir`.
pub fn resolve_database_path(config: &GptbotConfig, data_dir: &Path) -> PathBuf {
    match &config.database_path {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => data_dir.join(path),
        None => default_database_path(data_dir),
    }
}

/// Read the API credential from the environment variable named in `config`.
pub fn resolve_api_key(config: &GptbotConfig) -> Result<SecretString, ConfigError> {
    match std::env::var(&config.api_key_env) {
        Ok(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
        _ => Err(ConfigError::MissingCredential(config.api_key_env.clone())),
    }
}
