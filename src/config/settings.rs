//! Settings sections of the config file

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Config;
use crate::directory::{DirectoryUser, StaticDirectory};

/// `[database]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file; defaults to `~/.guild-xp/xp.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// How long a statement waits for a locked database
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl DatabaseSettings {
    /// Configured path or the default location
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| Config::global_config_dir().join("xp.db"))
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// `[leaderboard]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardSettings {
    /// Rows shown when no limit is given
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Resolve users missing from the directory cache
    #[serde(default)]
    pub fetch_missing: bool,
}

fn default_limit() -> usize {
    10
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            fetch_missing: false,
        }
    }
}

/// `[directory]` section: users keyed by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySettings {
    #[serde(default)]
    pub users: HashMap<String, DirectoryUser>,
}

impl DirectorySettings {
    pub fn to_directory(&self) -> StaticDirectory {
        StaticDirectory::from(self.users.clone())
    }
}
