//! Role rewards: "reaching level L in guild G grants role R"

use anyhow::Result;
use rusqlite::{params, OptionalExtension};
use tracing::debug;

use super::db::XpDb;
use super::models::{RewardGroup, RoleReward, ROLE_REWARD_COLUMNS};
use super::{require_id, require_positive, settle, settle_or};
use crate::error::{Outcome, XpError};
use crate::timestamp;

/// Role reward operations
#[derive(Clone)]
pub struct RewardStore {
    db: XpDb,
}

impl RewardStore {
    pub fn new(db: XpDb) -> Self {
        Self { db }
    }

    /// Register a reward for `level`. `Conflict` if the level already has one.
    pub fn create_role_reward(&self, guild_id: &str, level: i64, role_id: &str) -> Result<Outcome<RoleReward>, XpError> {
        require_id(guild_id, "guild id")?;
        require_positive(level, "level")?;
        require_id(role_id, "role id")?;

        Ok(settle(
            "create role reward",
            self.try_create_role_reward(guild_id, level, role_id),
        ))
    }

    fn try_create_role_reward(&self, guild_id: &str, level: i64, role_id: &str) -> Result<Outcome<RoleReward>> {
        let conn = self.db.conn()?;

        let group_created = conn.execute(
            "INSERT OR IGNORE INTO reward_groups (guild_id, last_updated) VALUES (?1, ?2)",
            params![guild_id, timestamp::format(&timestamp::now())],
        )?;
        if group_created > 0 {
            debug!("Created reward group for guild {}", guild_id);
        }

        let exists = conn
            .query_row(
                "SELECT 1 FROM role_rewards WHERE guild_id = ?1 AND level = ?2",
                params![guild_id, level],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Ok(Outcome::Conflict);
        }

        let inserted = conn.execute(
            "INSERT INTO role_rewards (guild_id, level, role_id) VALUES (?1, ?2, ?3)",
            params![guild_id, level, role_id],
        )?;
        if inserted == 0 {
            return Ok(Outcome::Conflict);
        }

        debug!("Role {} rewarded at level {} in guild {}", role_id, level, guild_id);
        Ok(Outcome::Value(RoleReward {
            guild_id: guild_id.to_string(),
            level,
            role_id: role_id.to_string(),
        }))
    }

    /// Remove the reward for `level`. Returns whether a reward was removed.
    ///
    /// The guild's reward group is kept even when this removes its last entry.
    pub fn delete_role_reward(&self, guild_id: &str, level: i64) -> Result<bool, XpError> {
        require_id(guild_id, "guild id")?;
        require_positive(level, "level")?;

        Ok(settle_or(
            "delete role reward",
            self.try_delete_role_reward(guild_id, level),
            false,
        ))
    }

    fn try_delete_role_reward(&self, guild_id: &str, level: i64) -> Result<bool> {
        let conn = self.db.conn()?;

        conn.execute(
            "UPDATE reward_groups SET last_updated = ?1 WHERE guild_id = ?2",
            params![timestamp::format(&timestamp::now()), guild_id],
        )?;
        let deleted = conn.execute(
            "DELETE FROM role_rewards WHERE guild_id = ?1 AND level = ?2",
            params![guild_id, level],
        )?;

        Ok(deleted > 0)
    }

    /// The reward configured for `level`
    pub fn fetch_role_reward(&self, guild_id: &str, level: i64) -> Result<Outcome<RoleReward>, XpError> {
        require_id(guild_id, "guild id")?;
        require_positive(level, "level")?;

        let result = self.db.conn().and_then(|conn| {
            let reward = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM role_rewards WHERE guild_id = ?1 AND level = ?2",
                        ROLE_REWARD_COLUMNS
                    ),
                    params![guild_id, level],
                    RoleReward::from_row,
                )
                .optional()?;
            Ok(reward.map_or(Outcome::NotFound, Outcome::Value))
        });
        Ok(settle("fetch role reward", result))
    }

    /// Every reward of a guild, lowest level first
    pub fn fetch_role_rewards(&self, guild_id: &str) -> Result<Vec<RoleReward>, XpError> {
        require_id(guild_id, "guild id")?;

        let result = self.db.conn().and_then(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM role_rewards WHERE guild_id = ?1 ORDER BY level ASC",
                ROLE_REWARD_COLUMNS
            ))?;
            let rewards = stmt
                .query_map(params![guild_id], RoleReward::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rewards)
        });
        Ok(settle_or("fetch role rewards", result, Vec::new()))
    }

    /// The guild's reward group, if a reward was ever created there
    pub fn fetch_reward_group(&self, guild_id: &str) -> Result<Outcome<RewardGroup>, XpError> {
        require_id(guild_id, "guild id")?;

        let result = self.db.conn().and_then(|conn| {
            let group = conn
                .query_row(
                    "SELECT guild_id, last_updated FROM reward_groups WHERE guild_id = ?1",
                    params![guild_id],
                    RewardGroup::from_row,
                )
                .optional()?;
            Ok(group.map_or(Outcome::NotFound, Outcome::Value))
        });
        Ok(settle("fetch reward group", result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::XpStore;
    use tempfile::tempdir;

    #[test]
    fn test_validation() {
        let dir = tempdir().unwrap();
        let store = XpStore::open(dir.path().join("xp.db")).unwrap();
        let rewards = store.rewards().unwrap();

        assert!(matches!(
            rewards.create_role_reward("", 5, "r"),
            Err(XpError::InvalidArgument(_))
        ));
        assert!(matches!(
            rewards.create_role_reward("g", 0, "r"),
            Err(XpError::InvalidArgument(_))
        ));
        assert!(matches!(
            rewards.create_role_reward("g", 5, ""),
            Err(XpError::InvalidArgument(_))
        ));
        assert!(matches!(rewards.delete_role_reward("g", 0), Err(XpError::InvalidArgument(_))));
        assert!(matches!(rewards.fetch_role_reward("", 1), Err(XpError::InvalidArgument(_))));
    }

    #[test]
    fn test_group_survives_last_reward_removal() {
        let dir = tempdir().unwrap();
        let store = XpStore::open(dir.path().join("xp.db")).unwrap();
        let rewards = store.rewards().unwrap();

        assert!(rewards.create_role_reward("g", 3, "role-3").unwrap().is_value());
        assert!(rewards.delete_role_reward("g", 3).unwrap());
        assert!(rewards.fetch_role_rewards("g").unwrap().is_empty());
        assert!(rewards.fetch_reward_group("g").unwrap().is_value());
    }
}
