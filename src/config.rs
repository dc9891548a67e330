//src/config.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "config.toml";
const SESSION_FILE_NAME: &str = "session.json";
const STORE_FILE_NAME: &str = "workouts.json";
const APP_CONFIG_DIR: &str = "setlog";
const CONFIG_ENV_VAR: &str = "SETLOG_CONFIG_DIR"; // Environment variable name

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine configuration directory.")]
    CannotDetermineConfigDir,
    #[error("Could not determine data directory.")]
    CannotDetermineDataDir,
    #[error("I/O error accessing config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file (TOML): {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize config data (TOML): {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Failed to parse session file: {0}")]
    SessionParse(#[from] serde_json::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)] // Ensure defaults are used if fields are missing
pub struct Config {
    /// Base URL of the workout API.
    pub api_base_url: String,
    /// When true, skip the API entirely and keep workouts in a local file.
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: "http://localhost:3000".to_string(),
            offline: false,
        }
    }
}

/// The persisted shape of the session file. Holds only the short-lived
/// access token; the refresh credential lives in the HTTP cookie store.
#[derive(Serialize, Deserialize, Debug)]
struct SessionFile {
    token: String,
}

fn config_dir() -> Result<PathBuf, ConfigError> {
    let config_dir_override = std::env::var(CONFIG_ENV_VAR).ok();

    let config_dir_path = match config_dir_override {
        Some(path_str) => {
            let path = PathBuf::from(path_str);
            if !path.is_dir() {
                fs::create_dir_all(&path)?;
            }
            path
        }
        None => {
            let base_config_dir = dirs::config_dir().ok_or(ConfigError::CannotDetermineConfigDir)?;
            base_config_dir.join(APP_CONFIG_DIR)
        }
    };

    if !config_dir_path.exists() {
        fs::create_dir_all(&config_dir_path)?;
    }

    Ok(config_dir_path)
}

/// Determines the path to the configuration file.
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Determines the path to the session token file (same directory as config).
pub fn get_session_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(SESSION_FILE_NAME))
}

/// Determines the path of the offline store file.
pub fn get_store_path() -> Result<PathBuf, ConfigError> {
    let base_data_dir = dirs::data_dir().ok_or(ConfigError::CannotDetermineDataDir)?;
    let data_dir = base_data_dir.join(APP_CONFIG_DIR);
    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }
    Ok(data_dir.join(STORE_FILE_NAME))
}

/// Loads the configuration, writing a default file on first run.
pub fn load(config_path: &Path) -> Result<Config, ConfigError> {
    if !config_path.exists() {
        let default_config = Config::default();
        save(config_path, &default_config)?;
        Ok(default_config)
    } else {
        let config_content = fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&config_content).map_err(ConfigError::TomlParse)?;
        Ok(config)
    }
}

/// Saves the configuration to the TOML file.
pub fn save(config_path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let config_content = toml::to_string_pretty(config).map_err(ConfigError::TomlSerialize)?;
    fs::write(config_path, config_content)?;
    Ok(())
}

/// Reads the stored access token, if any.
pub fn load_token(session_path: &Path) -> Result<Option<String>, ConfigError> {
    if !session_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(session_path)?;
    let session: SessionFile = serde_json::from_str(&content)?;
    Ok(Some(session.token))
}

/// Writes the access token to the session file.
pub fn save_token(session_path: &Path, token: &str) -> Result<(), ConfigError> {
    if let Some(parent_dir) = session_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)?;
        }
    }
    let session = SessionFile {
        token: token.to_string(),
    };
    fs::write(session_path, serde_json::to_string(&session)?)?;
    Ok(())
}

/// Deletes the session file. Missing file is not an error.
pub fn clear_token(session_path: &Path) -> Result<(), ConfigError> {
    match fs::remove_file(session_path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(ConfigError::Io(err)),
    }
}
