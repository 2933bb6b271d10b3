//! Configuration for the recall tool

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "recall.toml";

/// Database file used when nothing else is configured
pub const DEFAULT_DATABASE_PATH: &str = "db.sqlite3";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQLite database holding notes and reviews
    pub database_path: PathBuf,

    /// `tracing` filter directive, e.g. `"spaced_recall=debug"`
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            log_filter: None,
        }
    }
}

impl Config {
    /// Parses a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads configuration
    ///
    /// An explicit path must exist. Without one, `recall.toml` in the
    /// working directory is used if present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml(&content)
            }
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(Some(fallback))
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Applies overrides coming from flags or environment
    #[must_use]
    pub fn with_database_path(mut self, database_path: Option<PathBuf>) -> Self {
        if let Some(path) = database_path {
            self.database_path = path;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database_path, PathBuf::from("db.sqlite3"));
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(r#"log_filter = "debug""#).unwrap();
        assert_eq!(config.database_path, PathBuf::from("db.sqlite3"));
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(matches!(
            Config::from_toml("databse_path = \"x\""),
            Err(Error::Toml(_))
        ));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recall.toml");
        std::fs::write(&path, "database_path = \"/tmp/notes.db\"\n").unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/notes.db"));
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let result = Config::load(Some(Path::new("/nonexistent/recall.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_override_database_path() {
        let config = Config::default().with_database_path(Some(PathBuf::from("other.db")));
        assert_eq!(config.database_path, PathBuf::from("other.db"));
        let config = config.with_database_path(None);
        assert_eq!(config.database_path, PathBuf::from("other.db"));
    }
}
