//! Records stored in and returned by the XP database

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::leveling::LevelProgress;
use crate::timestamp;

/// Column list matching [`UserLevel::from_row`]
pub(crate) const USER_LEVEL_COLUMNS: &str = "user_id, guild_id, xp, level, last_updated";

/// Column list matching [`RoleReward::from_row`]
pub(crate) const ROLE_REWARD_COLUMNS: &str = "guild_id, level, role_id";

/// One user's progress in one guild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLevel {
    pub user_id: String,
    pub guild_id: String,
    pub xp: i64,
    pub level: i64,
    pub last_updated: DateTime<Utc>,

    /// 1-based rank in the guild, only set when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,
    /// XP earned within the current level (set by `fetch`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_xp: Option<i64>,
    /// XP span of the current level (set by `fetch`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean_next_level_xp: Option<i64>,
}

impl UserLevel {
    /// Fresh zero record
    pub fn new(user_id: &str, guild_id: &str, last_updated: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            guild_id: guild_id.to_string(),
            xp: 0,
            level: 0,
            last_updated,
            position: None,
            clean_xp: None,
            clean_next_level_xp: None,
        }
    }

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let raw: String = row.get(4)?;
        let last_updated = timestamp::parse(&raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                format!("Invalid last_updated value: {}", raw).into(),
            )
        })?;

        Ok(Self {
            user_id: row.get(0)?,
            guild_id: row.get(1)?,
            xp: row.get(2)?,
            level: row.get(3)?,
            last_updated,
            position: None,
            clean_xp: None,
            clean_next_level_xp: None,
        })
    }

    /// Progress within the current level
    pub fn progress(&self) -> LevelProgress {
        LevelProgress::for_xp(self.xp)
    }

    /// Fill `clean_xp` and `clean_next_level_xp` from `xp`.
    pub(crate) fn with_progress(mut self) -> Self {
        let progress = self.progress();
        self.clean_xp = Some(progress.clean_xp);
        self.clean_next_level_xp = Some(progress.clean_next_level_xp);
        self
    }
}

/// Per-guild container for role rewards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardGroup {
    pub guild_id: String,
    pub last_updated: DateTime<Utc>,
}

impl RewardGroup {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let raw: String = row.get(1)?;
        let last_updated = timestamp::parse(&raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                1,
                Type::Text,
                format!("Invalid last_updated value: {}", raw).into(),
            )
        })?;
        Ok(Self {
            guild_id: row.get(0)?,
            last_updated,
        })
    }
}

/// "Reaching `level` in `guild_id` grants `role_id`"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleReward {
    pub guild_id: String,
    pub level: i64,
    pub role_id: String,
}

impl RoleReward {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            guild_id: row.get(0)?,
            level: row.get(1)?,
            role_id: row.get(2)?,
        })
    }
}

/// Leaderboard row enriched with the user's display name
///
/// The record is flattened into the entry; its own `position` stays unset
/// so the rank appears once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(flatten)]
    pub user: UserLevel,
    pub position: u64,
    pub username: String,
    pub discriminator: String,
}

impl LeaderboardEntry {
    /// `username#discriminator`, or just the username for discriminator "0"
    pub fn tag(&self) -> String {
        if self.discriminator == "0" {
            self.username.clone()
        } else {
            format!("{}#{}", self.username, self.discriminator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_progress() {
        let mut user = UserLevel::new("u", "g", timestamp::now());
        user.xp = 450;
        user.level = 2;
        let user = user.with_progress();
        assert_eq!(user.clean_xp, Some(50));
        assert_eq!(user.clean_next_level_xp, Some(500));
    }

    #[test]
    fn test_serialize_skips_unset_fields() {
        let user = UserLevel::new("u", "g", timestamp::now());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("position").is_none());
        assert_eq!(json["xp"], 0);
    }

    #[test]
    fn test_leaderboard_tag() {
        let entry = LeaderboardEntry {
            user: UserLevel::new("u", "g", timestamp::now()),
            position: 1,
            username: "alice".to_string(),
            discriminator: "0001".to_string(),
        };
        assert_eq!(entry.tag(), "alice#0001");
    }

    #[test]
    fn test_leaderboard_entry_serializes_flat() {
        let mut user = UserLevel::new("u", "g", timestamp::now());
        user.xp = 300;
        let entry = LeaderboardEntry {
            user,
            position: 2,
            username: "bob".to_string(),
            discriminator: "0".to_string(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("user").is_none());
        assert_eq!(json["user_id"], "u");
        assert_eq!(json["xp"], 300);
        assert_eq!(json["position"], 2);

        let back: LeaderboardEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
