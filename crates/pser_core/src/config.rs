//! Core runtime configuration.
//!
//! # Responsibility
//! - Resolve store locations, logging options and the clear-all phrase.
//! - Load overrides from `<data_dir>/pser.toml` when present.
//!
//! # Invariants
//! - A missing config file yields defaults; a malformed one is an error.
//! - Relative paths in the file resolve against `data_dir`.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "pser.toml";
pub const DEFAULT_DATABASE_FILE: &str = "pser_survey.sqlite3";
pub const DEFAULT_FALLBACK_KEY: &str = "pser_surveys";
pub const DEFAULT_CLEAR_PHRASE: &str = "delete-all-surveys";
const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Directory holding the database, fallback blob and config file.
    #[serde(skip)]
    pub data_dir: PathBuf,
    pub database_file: String,
    pub fallback_key: String,
    pub log_level: String,
    pub log_dir: PathBuf,
    /// Phrase the user must type to clear all records.
    pub clear_phrase: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            fallback_key: DEFAULT_FALLBACK_KEY.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            clear_phrase: DEFAULT_CLEAR_PHRASE.to_string(),
        }
    }
}

impl CoreConfig {
    /// Defaults rooted at `data_dir`, ignoring any config file.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Reads `<data_dir>/pser.toml` over the defaults.
    pub fn load(data_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data_dir = data_dir.as_ref();
        let path = data_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::with_data_dir(data_dir));
        }

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let mut config: CoreConfig =
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        config.data_dir = data_dir.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn resolved_log_dir(&self) -> PathBuf {
        if self.log_dir.is_absolute() {
            self.log_dir.clone()
        } else {
            self.data_dir.join(&self.log_dir)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_file.trim().is_empty() {
            return Err(ConfigError::Invalid("database_file must not be empty"));
        }
        if self.fallback_key.trim().is_empty() {
            return Err(ConfigError::Invalid("fallback_key must not be empty"));
        }
        if self.clear_phrase.trim().is_empty() {
            return Err(ConfigError::Invalid("clear_phrase must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "reading {}: {source}", path.display()),
            Self::Parse { path, source } => write!(f, "parsing {}: {source}", path.display()),
            Self::Invalid(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, CONFIG_FILE_NAME, DEFAULT_FALLBACK_KEY};

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::load(dir.path()).unwrap();
        assert_eq!(config.fallback_key, DEFAULT_FALLBACK_KEY);
        assert_eq!(config.data_dir, dir.path());
        assert_eq!(
            config.database_path(),
            dir.path().join("pser_survey.sqlite3")
        );
        assert_eq!(config.resolved_log_dir(), dir.path().join("logs"));
    }

    #[test]
    fn file_overrides_selected_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "database_file = \"field.db\"\nclear_phrase = \"erase\"\n",
        )
        .unwrap();

        let config = CoreConfig::load(dir.path()).unwrap();
        assert_eq!(config.database_path(), dir.path().join("field.db"));
        assert_eq!(config.clear_phrase, "erase");
        assert_eq!(config.fallback_key, DEFAULT_FALLBACK_KEY);
    }

    #[test]
    fn malformed_or_blank_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        std::fs::write(&path, "database_file = [").unwrap();
        assert!(matches!(
            CoreConfig::load(dir.path()),
            Err(ConfigError::Parse { .. })
        ));

        std::fs::write(&path, "fallback_key = \" \"").unwrap();
        assert!(matches!(
            CoreConfig::load(dir.path()),
            Err(ConfigError::Invalid(_))
        ));
    }
}
