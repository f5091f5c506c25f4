//! Configuration loading and management

mod io;
mod settings;

pub use settings::{DatabaseSettings, DirectorySettings, LeaderboardSettings};

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Database location and connection settings
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Leaderboard defaults
    #[serde(default)]
    pub leaderboard: LeaderboardSettings,

    /// Known users for name lookups and cleanup
    #[serde(default)]
    pub directory: DirectorySettings,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults if it does not exist
    pub fn from_file_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::UserDirectory;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_config() {
        let content = r#"
[database]
path = "/tmp/guild-xp/xp.db"
busy_timeout_ms = 250

[leaderboard]
default_limit = 25
fetch_missing = true

[directory.users.1234]
username = "alice"
discriminator = "0001"

[directory.users.5678]
username = "bob"
"#;
        let config: Config = toml::from_str(content).unwrap();

        assert_eq!(config.database.path.as_deref(), Some(Path::new("/tmp/guild-xp/xp.db")));
        assert_eq!(config.database.busy_timeout().as_millis(), 250);
        assert_eq!(config.leaderboard.default_limit, 25);
        assert!(config.leaderboard.fetch_missing);

        let directory = config.directory.to_directory();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.cached("1234").unwrap().discriminator, "0001");
        assert_eq!(directory.cached("5678").unwrap().discriminator, "0");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.leaderboard.default_limit, 10);
        assert!(!config.leaderboard.fetch_missing);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_from_file_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let config = Config::from_file_or_default(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[leaderboard]\ndefault_limit = \"many\"\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
