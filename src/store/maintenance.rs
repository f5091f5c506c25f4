//! Guild-wide cleanup and deletion

use anyhow::Result;
use rusqlite::params;
use tracing::{debug, info, warn};

use super::db::XpDb;
use super::{require_id, settle_or};
use crate::directory::UserDirectory;
use crate::error::XpError;

/// Operations that touch every row of a guild
#[derive(Clone)]
pub struct GuildMaintenance {
    db: XpDb,
}

impl GuildMaintenance {
    pub fn new(db: XpDb) -> Self {
        Self { db }
    }

    /// Delete the records of users the directory can no longer resolve.
    ///
    /// Resolves every stored user of the guild one after another and returns
    /// the ids whose records were deleted.
    pub async fn clean_database(&self, directory: &dyn UserDirectory, guild_id: &str) -> Result<Vec<String>, XpError> {
        require_id(guild_id, "guild id")?;

        let user_ids = settle_or("list guild users", self.guild_user_ids(guild_id), Vec::new());
        let mut deleted = Vec::new();

        for user_id in user_ids {
            let resolved = directory.resolve(&user_id).await;
            if let Err(e) = resolved {
                debug!("User {} unreachable: {:#}", user_id, e);
                match self.delete_level_row(&user_id, guild_id) {
                    Ok(true) => deleted.push(user_id),
                    Ok(false) => {}
                    Err(e) => warn!("Failed to delete stale user {}: {:#}", user_id, e),
                }
            }
        }

        if !deleted.is_empty() {
            info!("Removed {} stale users from guild {}", deleted.len(), guild_id);
        }
        Ok(deleted)
    }

    /// Delete every reward, the reward group and every level record of a
    /// guild in one transaction. Returns `false` (with nothing deleted) on
    /// any failure.
    pub fn delete_guild(&self, guild_id: &str) -> Result<bool, XpError> {
        require_id(guild_id, "guild id")?;

        Ok(settle_or(
            "delete guild",
            self.try_delete_guild(guild_id).map(|_| true),
            false,
        ))
    }

    fn try_delete_guild(&self, guild_id: &str) -> Result<()> {
        let mut conn = self.db.conn()?;
        let tx = conn.transaction()?;

        let rewards = tx.execute("DELETE FROM role_rewards WHERE guild_id = ?1", params![guild_id])?;
        let groups = tx.execute("DELETE FROM reward_groups WHERE guild_id = ?1", params![guild_id])?;
        let users = tx.execute("DELETE FROM user_levels WHERE guild_id = ?1", params![guild_id])?;

        tx.commit()?;
        info!(
            "Deleted guild {}: {} rewards, {} groups, {} users",
            guild_id, rewards, groups, users
        );
        Ok(())
    }

    fn guild_user_ids(&self, guild_id: &str) -> Result<Vec<String>> {
        let conn = self.db.conn()?;
        let mut stmt = conn.prepare("SELECT user_id FROM user_levels WHERE guild_id = ?1")?;
        let ids = stmt
            .query_map(params![guild_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }

    fn delete_level_row(&self, user_id: &str, guild_id: &str) -> Result<bool> {
        let conn = self.db.conn()?;
        let deleted = conn.execute(
            "DELETE FROM user_levels WHERE user_id = ?1 AND guild_id = ?2",
            params![user_id, guild_id],
        )?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticDirectory;
    use crate::store::XpStore;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_clean_empty_guild() {
        let dir = tempdir().unwrap();
        let store = XpStore::open(dir.path().join("xp.db")).unwrap();
        let maintenance = store.maintenance().unwrap();

        let deleted = maintenance
            .clean_database(&StaticDirectory::new(), "g")
            .await
            .unwrap();
        assert!(deleted.is_empty());
    }

    #[test]
    fn test_delete_unknown_guild_succeeds() {
        let dir = tempdir().unwrap();
        let store = XpStore::open(dir.path().join("xp.db")).unwrap();
        assert!(store.maintenance().unwrap().delete_guild("nobody").unwrap());
    }

    #[test]
    fn test_delete_guild_requires_id() {
        let dir = tempdir().unwrap();
        let store = XpStore::open(dir.path().join("xp.db")).unwrap();
        assert!(matches!(
            store.maintenance().unwrap().delete_guild(""),
            Err(XpError::InvalidArgument(_))
        ));
    }
}
