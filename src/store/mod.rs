//! XP storage backed by SQLite
//!
//! [`XpStore`] is the handle a host keeps for the lifetime of the process.
//! It is configured once with a database path and then hands out cheap
//! per-concern views sharing the same connection.
//!
//! # Usage
//!
//! ```ignore
//! let store = XpStore::open("xp.db")?;
//!
//! // Per chat message
//! if store.levels()?.append_xp(&user_id, &guild_id, 15)? {
//!     let user = store.levels()?.fetch(&user_id, &guild_id, false)?;
//! }
//!
//! // Per admin command
//! store.rewards()?.create_role_reward(&guild_id, 5, &role_id)?;
//! ```

mod db;
mod leaderboard;
mod levels;
mod maintenance;
mod models;
mod rewards;
mod schema;

pub use db::{XpDb, DEFAULT_BUSY_TIMEOUT};
pub use leaderboard::compute_leaderboard;
pub use levels::LevelStore;
pub use maintenance::GuildMaintenance;
pub use models::{LeaderboardEntry, RewardGroup, RoleReward, UserLevel};
pub use rewards::RewardStore;
pub use schema::ensure_schema;

use std::path::Path;
use std::time::Duration;

use tracing::{info, warn};

use crate::error::{Outcome, XpError};

/// Entry point to all XP storage operations
#[derive(Clone)]
pub struct XpStore {
    db: Option<XpDb>,
    busy_timeout: Duration,
}

impl Default for XpStore {
    fn default() -> Self {
        Self {
            db: None,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl XpStore {
    /// Unconfigured store; every accessor fails until [`Self::configure`] runs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a new store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, XpError> {
        let mut store = Self::new();
        store.configure(path)?;
        Ok(store)
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Ensure the schema at `path` and (re)open the shared connection.
    ///
    /// Clones made before a reconfigure keep the old connection.
    pub fn configure(&mut self, path: impl AsRef<Path>) -> Result<(), XpError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(XpError::invalid("a database path was not provided"));
        }

        ensure_schema(path)?;
        self.db = Some(XpDb::open(path, self.busy_timeout)?);

        info!("XP database ready at {}", path.display());
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.db.is_some()
    }

    /// Path of the configured database
    pub fn path(&self) -> Option<&Path> {
        self.db.as_ref().map(|db| db.path())
    }

    fn db(&self) -> Result<XpDb, XpError> {
        self.db.clone().ok_or(XpError::NotConfigured)
    }

    /// Per-user XP and level operations
    pub fn levels(&self) -> Result<LevelStore, XpError> {
        Ok(LevelStore::new(self.db()?))
    }

    /// Role reward operations
    pub fn rewards(&self) -> Result<RewardStore, XpError> {
        Ok(RewardStore::new(self.db()?))
    }

    /// Guild-wide cleanup and deletion
    pub fn maintenance(&self) -> Result<GuildMaintenance, XpError> {
        Ok(GuildMaintenance::new(self.db()?))
    }
}

/// Parse a user-entered amount of XP or levels.
pub fn parse_amount(text: &str) -> Result<i64, XpError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| XpError::invalid(format!("amount '{}' is not a valid integer", text)))
}

pub(crate) fn require_id(value: &str, what: &str) -> Result<(), XpError> {
    if value.trim().is_empty() {
        return Err(XpError::invalid(format!("{} was not provided", what)));
    }
    Ok(())
}

pub(crate) fn require_positive(value: i64, what: &str) -> Result<(), XpError> {
    if value <= 0 {
        return Err(XpError::invalid(format!(
            "{} must be a positive integer, got {}",
            what, value
        )));
    }
    Ok(())
}

pub(crate) fn require_non_zero(value: i64, what: &str) -> Result<(), XpError> {
    if value == 0 {
        return Err(XpError::invalid(format!("{} was not provided", what)));
    }
    Ok(())
}

/// Log a storage failure and turn it into [`Outcome::StorageError`].
pub(crate) fn settle<T>(op: &str, result: anyhow::Result<Outcome<T>>) -> Outcome<T> {
    result.unwrap_or_else(|e| {
        warn!("Failed to {}: {:#}", op, e);
        Outcome::StorageError
    })
}

/// Log a storage failure and return `fallback` instead.
pub(crate) fn settle_or<T>(op: &str, result: anyhow::Result<T>, fallback: T) -> T {
    result.unwrap_or_else(|e| {
        warn!("Failed to {}: {:#}", op, e);
        fallback
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unconfigured_store() {
        let store = XpStore::new();
        assert!(!store.is_configured());
        assert!(matches!(store.levels(), Err(XpError::NotConfigured)));
        assert!(matches!(store.rewards(), Err(XpError::NotConfigured)));
        assert!(matches!(store.maintenance(), Err(XpError::NotConfigured)));
    }

    #[test]
    fn test_configure_empty_path() {
        let mut store = XpStore::new();
        assert!(matches!(store.configure(""), Err(XpError::InvalidArgument(_))));
    }

    #[test]
    fn test_reconfigure_switches_database() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.db");
        let second = dir.path().join("second.db");

        let mut store = XpStore::open(&first).unwrap();
        store.levels().unwrap().set_xp("u", "g", 500).unwrap();

        store.configure(&second).unwrap();
        assert_eq!(store.path(), Some(second.as_path()));
        let user = store.levels().unwrap().fetch("u", "g", false).unwrap();
        assert_eq!(user.into_option().unwrap().xp, 0);

        store.configure(&first).unwrap();
        let user = store.levels().unwrap().fetch("u", "g", false).unwrap();
        assert_eq!(user.into_option().unwrap().xp, 500);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("25").unwrap(), 25);
        assert_eq!(parse_amount(" -3 ").unwrap(), -3);
        assert!(matches!(parse_amount("ten"), Err(XpError::InvalidArgument(_))));
        assert!(matches!(parse_amount("1.5"), Err(XpError::InvalidArgument(_))));
    }

    #[test]
    fn test_require_helpers() {
        assert!(require_id("123", "user id").is_ok());
        assert!(require_id("  ", "user id").is_err());
        assert!(require_positive(1, "xp").is_ok());
        assert!(require_positive(0, "xp").is_err());
        assert!(require_non_zero(-2, "levels").is_ok());
        assert!(require_non_zero(0, "levels").is_err());
    }
}
