//! Per-user XP and level records
//!
//! Every mutating operation (and `fetch`) first makes sure the
//! `(user, guild)` row exists, then performs one read and one write under a
//! single lock of the shared connection.

use anyhow::{anyhow, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::db::XpDb;
use super::models::{UserLevel, USER_LEVEL_COLUMNS};
use super::{require_id, require_non_zero, require_positive, settle, settle_or};
use crate::error::{Outcome, XpError};
use crate::leveling::{level_for, xp_for};
use crate::timestamp;

/// XP and level operations for individual users
#[derive(Clone)]
pub struct LevelStore {
    db: XpDb,
}

impl LevelStore {
    pub fn new(db: XpDb) -> Self {
        Self { db }
    }

    /// Create a zero record. `Conflict` if the user already has one.
    ///
    /// Other operations create the record on their own, so calling this is
    /// only needed to register a user ahead of time.
    pub fn create_user(&self, user_id: &str, guild_id: &str) -> Result<Outcome<UserLevel>, XpError> {
        require_id(user_id, "user id")?;
        require_id(guild_id, "guild id")?;

        Ok(settle("create user", self.try_create_user(user_id, guild_id)))
    }

    fn try_create_user(&self, user_id: &str, guild_id: &str) -> Result<Outcome<UserLevel>> {
        let conn = self.db.conn()?;
        if select_user(&conn, user_id, guild_id)?.is_some() {
            return Ok(Outcome::Conflict);
        }

        let now = timestamp::now();
        let inserted = conn.execute(
            "INSERT INTO user_levels (user_id, guild_id, xp, level, last_updated) VALUES (?1, ?2, 0, 0, ?3)",
            params![user_id, guild_id, timestamp::format(&now)],
        )?;
        if inserted == 0 {
            return Ok(Outcome::Conflict);
        }

        debug!("Created user {} in guild {}", user_id, guild_id);
        Ok(Outcome::Value(UserLevel::new(user_id, guild_id, now)))
    }

    /// Delete a record, returning it as it was before deletion.
    pub fn delete_user(&self, user_id: &str, guild_id: &str) -> Result<Outcome<UserLevel>, XpError> {
        require_id(user_id, "user id")?;
        require_id(guild_id, "guild id")?;

        Ok(settle("delete user", self.try_delete_user(user_id, guild_id)))
    }

    fn try_delete_user(&self, user_id: &str, guild_id: &str) -> Result<Outcome<UserLevel>> {
        let conn = self.db.conn()?;
        let Some(user) = select_user(&conn, user_id, guild_id)? else {
            return Ok(Outcome::NotFound);
        };

        let deleted = conn.execute(
            "DELETE FROM user_levels WHERE user_id = ?1 AND guild_id = ?2",
            params![user_id, guild_id],
        )?;
        if deleted == 0 {
            return Ok(Outcome::NotFound);
        }

        debug!("Deleted user {} in guild {}", user_id, guild_id);
        Ok(Outcome::Value(user))
    }

    /// Add XP. Returns `true` when the user reached a higher level.
    pub fn append_xp(&self, user_id: &str, guild_id: &str, xp: i64) -> Result<bool, XpError> {
        require_id(user_id, "user id")?;
        require_id(guild_id, "guild id")?;
        require_positive(xp, "amount of xp")?;

        let result = self
            .update_progress(user_id, guild_id, |user| {
                let new_xp = user
                    .xp
                    .checked_add(xp)
                    .ok_or_else(|| anyhow!("xp total overflow for user {}", user.user_id))?;
                Ok((new_xp, level_for(new_xp)))
            })
            .map(|(old, new)| new.level > old.level);

        Ok(settle_or("append xp", result, false))
    }

    /// Add (or with a negative amount, remove) whole levels.
    ///
    /// XP is reset to the minimum of the resulting level; the level never
    /// drops below zero.
    pub fn append_level(&self, user_id: &str, guild_id: &str, levels: i64) -> Result<Outcome<UserLevel>, XpError> {
        require_id(user_id, "user id")?;
        require_id(guild_id, "guild id")?;
        require_non_zero(levels, "amount of levels")?;

        let result = self.update_progress(user_id, guild_id, |user| {
            let new_level = user.level.saturating_add(levels).max(0);
            Ok((xp_for(new_level)?, new_level))
        });
        settle_level("append level", result)
    }

    /// Replace the XP total and recompute the level.
    pub fn set_xp(&self, user_id: &str, guild_id: &str, xp: i64) -> Result<Outcome<UserLevel>, XpError> {
        require_id(user_id, "user id")?;
        require_id(guild_id, "guild id")?;
        require_positive(xp, "amount of xp")?;

        let result = self.update_progress(user_id, guild_id, |_| Ok((xp, level_for(xp))));
        Ok(settle("set xp", result.map(|(_, new)| Outcome::Value(new))))
    }

    /// Replace the level; XP becomes the minimum for that level.
    pub fn set_level(&self, user_id: &str, guild_id: &str, level: i64) -> Result<Outcome<UserLevel>, XpError> {
        require_id(user_id, "user id")?;
        require_id(guild_id, "guild id")?;
        require_non_zero(level, "level")?;
        let xp = xp_for(level)?;

        let result = self.update_progress(user_id, guild_id, |_| Ok((xp, level)));
        Ok(settle("set level", result.map(|(_, new)| Outcome::Value(new))))
    }

    /// Remove XP, stopping at zero, and recompute the level.
    pub fn subtract_xp(&self, user_id: &str, guild_id: &str, xp: i64) -> Result<Outcome<UserLevel>, XpError> {
        require_id(user_id, "user id")?;
        require_id(guild_id, "guild id")?;
        require_positive(xp, "amount of xp")?;

        let result = self.update_progress(user_id, guild_id, |user| {
            let new_xp = user.xp.saturating_sub(xp).max(0);
            Ok((new_xp, level_for(new_xp)))
        });
        Ok(settle("subtract xp", result.map(|(_, new)| Outcome::Value(new))))
    }

    /// Remove whole levels, stopping at zero; XP becomes the level minimum.
    pub fn subtract_level(&self, user_id: &str, guild_id: &str, levels: i64) -> Result<Outcome<UserLevel>, XpError> {
        require_id(user_id, "user id")?;
        require_id(guild_id, "guild id")?;
        require_non_zero(levels, "amount of levels")?;

        let result = self.update_progress(user_id, guild_id, |user| {
            let new_level = user.level.saturating_sub(levels).max(0);
            Ok((xp_for(new_level)?, new_level))
        });
        settle_level("subtract levels", result)
    }

    /// Load a user's record with level progress attached.
    ///
    /// With `with_position`, also computes the 1-based rank in the guild:
    /// one more than the number of users with strictly more XP.
    pub fn fetch(&self, user_id: &str, guild_id: &str, with_position: bool) -> Result<Outcome<UserLevel>, XpError> {
        require_id(user_id, "user id")?;
        require_id(guild_id, "guild id")?;

        Ok(settle("fetch user", self.try_fetch(user_id, guild_id, with_position)))
    }

    fn try_fetch(&self, user_id: &str, guild_id: &str, with_position: bool) -> Result<Outcome<UserLevel>> {
        let conn = self.db.conn()?;
        ensure_user_exists(&conn, user_id, guild_id)?;

        let Some(mut user) = select_user(&conn, user_id, guild_id)? else {
            return Ok(Outcome::NotFound);
        };

        if with_position {
            let ahead: i64 = conn.query_row(
                "SELECT COUNT(*) FROM user_levels WHERE guild_id = ?1 AND xp > ?2",
                params![guild_id, user.xp],
                |r| r.get(0),
            )?;
            user.position = Some(ahead as u64 + 1);
        }

        Ok(Outcome::Value(user.with_progress()))
    }

    /// Top `limit` users of a guild by XP, highest first.
    pub fn fetch_leaderboard(&self, guild_id: &str, limit: usize) -> Result<Vec<UserLevel>, XpError> {
        require_id(guild_id, "guild id")?;
        if limit == 0 {
            return Err(XpError::invalid("a limit was not provided"));
        }

        Ok(settle_or(
            "fetch leaderboard",
            self.try_fetch_leaderboard(guild_id, limit),
            Vec::new(),
        ))
    }

    fn try_fetch_leaderboard(&self, guild_id: &str, limit: usize) -> Result<Vec<UserLevel>> {
        let conn = self.db.conn()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM user_levels WHERE guild_id = ?1 ORDER BY xp DESC, user_id ASC LIMIT ?2",
            USER_LEVEL_COLUMNS
        ))?;
        let users = stmt
            .query_map(params![guild_id, limit], UserLevel::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    /// Auto-vivify, read, compute `(xp, level)` with `apply`, write back.
    ///
    /// Runs in one transaction: if `apply` fails, nothing is written, not
    /// even the auto-created row. Returns the record before and after.
    fn update_progress<F>(&self, user_id: &str, guild_id: &str, apply: F) -> Result<(UserLevel, UserLevel)>
    where
        F: FnOnce(&UserLevel) -> Result<(i64, i64)>,
    {
        let mut conn = self.db.conn()?;
        let tx = conn.transaction()?;
        ensure_user_exists(&tx, user_id, guild_id)?;

        let old = select_user(&tx, user_id, guild_id)?
            .ok_or_else(|| anyhow!("record for user {} in guild {} disappeared", user_id, guild_id))?;
        let (xp, level) = apply(&old)?;
        let now = timestamp::now();

        tx.execute(
            "UPDATE user_levels SET xp = ?1, level = ?2, last_updated = ?3 WHERE user_id = ?4 AND guild_id = ?5",
            params![xp, level, timestamp::format(&now), user_id, guild_id],
        )?;
        tx.commit()?;

        debug!(
            "User {} in guild {}: xp {} -> {}, level {} -> {}",
            user_id, guild_id, old.xp, xp, old.level, level
        );

        let new = UserLevel {
            xp,
            level,
            last_updated: now,
            ..old.clone()
        };
        Ok((old, new))
    }
}

/// Like [`settle`], but a typed [`XpError`] raised while computing the new
/// level (e.g. `OutOfRange`) is returned as an error instead of being logged
/// as a storage failure.
fn settle_level(op: &str, result: Result<(UserLevel, UserLevel)>) -> Result<Outcome<UserLevel>, XpError> {
    match result {
        Ok((_, new)) => Ok(Outcome::Value(new)),
        Err(e) => match e.downcast::<XpError>() {
            Ok(err) => Err(err),
            Err(e) => Ok(settle(op, Err(e))),
        },
    }
}

/// Insert a zero record for `(user_id, guild_id)` unless one exists.
fn ensure_user_exists(conn: &Connection, user_id: &str, guild_id: &str) -> rusqlite::Result<()> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO user_levels (user_id, guild_id, xp, level, last_updated)
         VALUES (?1, ?2, 0, 0, CURRENT_TIMESTAMP)",
        params![user_id, guild_id],
    )?;
    if inserted > 0 {
        debug!("Auto-created user {} in guild {}", user_id, guild_id);
    }
    Ok(())
}

fn select_user(conn: &Connection, user_id: &str, guild_id: &str) -> rusqlite::Result<Option<UserLevel>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM user_levels WHERE user_id = ?1 AND guild_id = ?2",
            USER_LEVEL_COLUMNS
        ),
        params![user_id, guild_id],
        UserLevel::from_row,
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::XpStore;
    use tempfile::{tempdir, TempDir};

    fn setup() -> (TempDir, LevelStore) {
        let dir = tempdir().unwrap();
        let store = XpStore::open(dir.path().join("xp.db")).unwrap();
        let levels = store.levels().unwrap();
        (dir, levels)
    }

    #[test]
    fn test_update_progress_returns_old_and_new() {
        let (_dir, levels) = setup();
        let (old, new) = levels
            .update_progress("u", "g", |user| Ok((user.xp + 150, level_for(user.xp + 150))))
            .unwrap();
        assert_eq!(old.xp, 0);
        assert_eq!(new.xp, 150);
        assert_eq!(new.level, 1);
    }

    #[test]
    fn test_storage_failure_is_swallowed() {
        let (_dir, levels) = setup();
        levels
            .db
            .conn()
            .unwrap()
            .execute_batch("DROP TABLE user_levels;")
            .unwrap();

        assert!(!levels.append_xp("u", "g", 10).unwrap());
        assert!(levels.fetch("u", "g", true).unwrap().is_storage_error());
        assert!(levels.set_xp("u", "g", 10).unwrap().is_storage_error());
        assert!(levels.fetch_leaderboard("g", 10).unwrap().is_empty());
    }

    #[test]
    fn test_validation_runs_before_storage() {
        let (_dir, levels) = setup();
        assert!(matches!(levels.append_xp("", "g", 10), Err(XpError::InvalidArgument(_))));
        assert!(matches!(levels.append_xp("u", "g", 0), Err(XpError::InvalidArgument(_))));
        assert!(matches!(levels.subtract_xp("u", "g", -5), Err(XpError::InvalidArgument(_))));
        assert!(matches!(levels.append_level("u", "g", 0), Err(XpError::InvalidArgument(_))));
        assert!(matches!(levels.set_level("u", "g", 0), Err(XpError::InvalidArgument(_))));
        assert!(matches!(levels.set_level("u", "g", -1), Err(XpError::OutOfRange(_))));
        assert!(matches!(levels.fetch_leaderboard("g", 0), Err(XpError::InvalidArgument(_))));

        // Nothing was auto-created by the rejected calls
        let board = levels.fetch_leaderboard("g", 10).unwrap();
        assert!(board.is_empty());
    }

    #[test]
    fn test_level_overflow_is_out_of_range_and_writes_nothing() {
        let (_dir, levels) = setup();

        assert!(matches!(
            levels.append_level("big", "g", 400_000_000),
            Err(XpError::OutOfRange(_))
        ));
        assert!(matches!(
            levels.subtract_level("big", "g", -400_000_000),
            Err(XpError::OutOfRange(_))
        ));

        // The failed update rolled back the auto-created row as well
        let conn = levels.db.conn().unwrap();
        assert!(select_user(&conn, "big", "g").unwrap().is_none());
    }
}
