//! Runtime configuration for core callers.
//!
//! # Responsibility
//! - Collect store location, logging and paging defaults from the
//!   environment.
//!
//! # Invariants
//! - Loading never panics; malformed values surface as `ConfigError`.
//! - `default_page_size` is at least 1.

use crate::logging::{default_log_level, normalize_level};
use crate::search::DEFAULT_PAGE_SIZE;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "STAFFLINE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "STAFFLINE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "STAFFLINE_LOG_DIR";
pub const ENV_PAGE_SIZE: &str = "STAFFLINE_PAGE_SIZE";

const DEFAULT_DB_FILE_NAME: &str = "staffline.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue {
                key,
                value,
                message,
            } => write!(f, "invalid {key} `{value}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Settings shared by every entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: &'static str,
    /// Absolute log directory; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub default_page_size: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level(),
            log_dir: None,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset or blank keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level =
                normalize_level(&level).map_err(|message| ConfigError::InvalidValue {
                    key: ENV_LOG_LEVEL,
                    value: level.clone(),
                    message,
                })?;
        }

        if let Some(dir) = read(ENV_LOG_DIR) {
            let path = PathBuf::from(&dir);
            if !path.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_LOG_DIR,
                    value: dir,
                    message: "must be an absolute path".to_string(),
                });
            }
            config.log_dir = Some(path);
        }

        if let Some(size) = read(ENV_PAGE_SIZE) {
            config.default_page_size = parse_page_size(&size)?;
        }

        Ok(config)
    }
}

fn parse_page_size(value: &str) -> Result<u32, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidValue {
        key: ENV_PAGE_SIZE,
        value: value.to_string(),
        message,
    };
    let size: u32 = value
        .parse()
        .map_err(|err| invalid(format!("not a positive integer: {err}")))?;
    if size == 0 {
        return Err(invalid("expected at least 1".to_string()));
    }
    Ok(size)
}
