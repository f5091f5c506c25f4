//! Table definitions and idempotent schema setup

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::error::XpError;

/// Create the database file (and parent directory) if needed and make sure
/// all tables exist. Uses a short-lived connection that is closed on return.
pub fn ensure_schema(path: &Path) -> Result<(), XpError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA_SQL)?;
    conn.close().map_err(|(_, e)| XpError::Database(e))?;

    debug!("Schema ensured at {}", path.display());
    Ok(())
}

/// SQL schema for the XP database
pub(crate) const SCHEMA_SQL: &str = r#"
-- Per-user progress, one row per (user, guild)
CREATE TABLE IF NOT EXISTS user_levels (
    user_id TEXT NOT NULL,
    guild_id TEXT NOT NULL,
    xp INTEGER NOT NULL DEFAULT 0,
    level INTEGER NOT NULL DEFAULT 0,
    last_updated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (user_id, guild_id)
);
CREATE INDEX IF NOT EXISTS idx_user_levels_guild_xp ON user_levels(guild_id, xp DESC);

-- One group per guild with at least one configured reward
CREATE TABLE IF NOT EXISTS reward_groups (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    guild_id TEXT NOT NULL UNIQUE,
    last_updated TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Level -> role mappings
CREATE TABLE IF NOT EXISTS role_rewards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    guild_id TEXT NOT NULL,
    level INTEGER NOT NULL,
    role_id TEXT NOT NULL,
    UNIQUE (guild_id, level),
    FOREIGN KEY (guild_id) REFERENCES reward_groups(guild_id) ON DELETE CASCADE
);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn table_names(path: &Path) -> Vec<String> {
        let conn = Connection::open(path).unwrap();
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_ensure_schema_creates_tables() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("xp.db");

        ensure_schema(&db_path).unwrap();

        assert!(db_path.exists());
        let tables = table_names(&db_path);
        assert!(tables.contains(&"user_levels".to_string()));
        assert!(tables.contains(&"reward_groups".to_string()));
        assert!(tables.contains(&"role_rewards".to_string()));
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("xp.db");

        ensure_schema(&db_path).unwrap();
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute(
                "INSERT INTO user_levels (user_id, guild_id, xp, level) VALUES ('u', 'g', 400, 2)",
                [],
            )
            .unwrap();
        }
        ensure_schema(&db_path).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let xp: i64 = conn
            .query_row("SELECT xp FROM user_levels WHERE user_id = 'u'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(xp, 400);
    }
}
