//! Runtime configuration
//!
//! Read from a YAML file: an explicit `--config` path, or
//! `<config_dir>/quantlink/config.yaml` when it exists. Command-line flags
//! override file values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Log level used when neither the command line nor the file sets one
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQLite database file
    pub db_path: Option<PathBuf>,
    /// tracing filter level: error, warn, info, debug or trace
    pub log_level: Option<String>,
}

impl Config {
    /// Parse a config from YAML text. Empty text is an empty config.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the explicit file if given, else the default file if present,
    /// else an empty config.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Database path: flag, then file, then the platform data dir.
    pub fn resolve_db_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.db_path.clone())
            .unwrap_or_else(default_db_path)
    }

    /// Log level: flag, then file, then `DEFAULT_LOG_LEVEL`.
    pub fn resolve_log_level(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.log_level.clone())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
    }
}

/// `<config_dir>/quantlink/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quantlink").join("config.yaml"))
}

/// Get the default database path (~/.local/share/quantlink/quantlink.db)
pub fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("quantlink").join("quantlink.db")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml() {
        let config = Config::from_yaml("db_path: /tmp/q.db\nlog_level: debug\n").unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/q.db")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("log_level: info").unwrap().db_path, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_yaml("database: x.db").is_err());
    }

    #[test]
    fn flags_override_file() {
        let config = Config {
            db_path: Some(PathBuf::from("file.db")),
            log_level: Some("info".into()),
        };
        assert_eq!(
            config.resolve_db_path(Some(PathBuf::from("flag.db"))),
            PathBuf::from("flag.db")
        );
        assert_eq!(config.resolve_db_path(None), PathBuf::from("file.db"));
        assert_eq!(config.resolve_log_level(Some("trace".into())), "trace");
        assert_eq!(Config::default().resolve_log_level(None), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn default_db_path_is_named_for_the_tool() {
        assert!(default_db_path().ends_with("quantlink/quantlink.db"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "db_path: graph.db\n").unwrap();
        assert_eq!(
            Config::discover(Some(&path)).unwrap().db_path,
            Some(PathBuf::from("graph.db"))
        );
    }
}
