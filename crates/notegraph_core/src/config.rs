//! Engine configuration.
//!
//! # Responsibility
//! - Hold tunables for daily notes, logging and storage location.
//! - Load them from TOML with per-field defaults.
//!
//! # Invariants
//! - A validated config always has a renderable `daily_title_format`.

use crate::logging::parse_level;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_DAILY_TITLE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DAILY_TAG: &str = "daily";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    InvalidDailyFormat(String),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidDailyFormat(format) => {
                write!(f, "daily_title_format `{format}` is not a valid date pattern")
            }
            Self::InvalidLogLevel(level) => write!(f, "log_level `{level}` is not a log level"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidDailyFormat(_) | Self::InvalidLogLevel(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// chrono strftime pattern for daily note titles.
    pub daily_title_format: String,
    /// Tags given to newly created daily notes.
    pub daily_tags: Vec<String>,
    /// `off|error|warn|info|debug|trace`; `None` uses the build default.
    pub log_level: Option<String>,
    /// Rolling log directory; `None` leaves file logging off.
    pub log_dir: Option<PathBuf>,
    /// SQLite file for the CLI; `None` means `notegraph.db` in the working directory.
    pub db_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            daily_title_format: DEFAULT_DAILY_TITLE_FORMAT.to_string(),
            daily_tags: vec![DEFAULT_DAILY_TAG.to_string()],
            log_level: None,
            log_dir: None,
            db_path: None,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let format = self.daily_title_format.as_str();
        let invalid = format.trim().is_empty()
            || StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
        if invalid {
            return Err(ConfigError::InvalidDailyFormat(format.to_string()));
        }
        if let Some(level) = &self.log_level {
            parse_level(level).map_err(|_| ConfigError::InvalidLogLevel(level.clone()))?;
        }
        Ok(())
    }
}
