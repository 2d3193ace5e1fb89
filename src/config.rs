use std::env;

use thiserror::Error;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: String,
    pub log_level: String,
    /// Evaluate pool fixtures on the rayon worker pool.
    pub parallel: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let db_path = env::var("SLIPCRAFT_DB").unwrap_or_else(|_| "./slipcraft.db".to_string());
        if db_path.trim().is_empty() {
            return Err(ConfigError::EmptyDbPath);
        }
        let log_level = env::var("SLIPCRAFT_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
        let parallel = match env::var("SLIPCRAFT_PARALLEL") {
            Ok(value) => parse_bool(&value).ok_or(ConfigError::InvalidParallel(value))?,
            Err(_) => true,
        };

        Ok(Self {
            db_path,
            log_level,
            parallel,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SLIPCRAFT_DB must not be empty")]
    EmptyDbPath,
    #[error("SLIPCRAFT_PARALLEL must be a boolean, got '{0}'")]
    InvalidParallel(String),
}
