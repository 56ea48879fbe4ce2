//! YAML configuration loading for the orgtree binary.
//!
//! # Responsibility
//! - Load database and logging settings from the configuration file.
//!
//! # Invariants
//! - The `sqlite` section is mandatory; its absence is a fatal startup
//!   error naming the section.
//! - The `logging` section is optional; without it no log file is
//!   written.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors from configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file cannot be read.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Configuration file is not valid YAML.
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    /// A mandatory section is absent.
    MissingSection {
        path: PathBuf,
        section: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config file `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(
                    f,
                    "config file `{}` is not valid YAML: {source}",
                    path.display()
                )
            }
            Self::MissingSection { path, section } => {
                write!(
                    f,
                    "config file `{}` has no `{section}` section",
                    path.display()
                )
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::MissingSection { .. } => None,
        }
    }
}

/// Connection parameters for the SQLite store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteConfig {
    /// Database file path.
    pub path: PathBuf,
}

/// Optional file-logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level; defaults to the build-mode default when absent.
    pub level: Option<String>,
    /// Absolute directory for rolling log files.
    pub dir: PathBuf,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub sqlite: SqliteConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    sqlite: Option<SqliteConfig>,
    logging: Option<LoggingConfig>,
}

/// Loads and validates the configuration file.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: RawConfig = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let sqlite = raw.sqlite.ok_or_else(|| ConfigError::MissingSection {
        path: path.to_path_buf(),
        section: "sqlite",
    })?;

    Ok(Config {
        sqlite,
        logging: raw.logging,
    })
}
