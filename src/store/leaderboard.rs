//! Leaderboard enrichment with display names

use std::collections::HashMap;

use tracing::debug;

use super::models::{LeaderboardEntry, UserLevel};
use crate::directory::{DirectoryUser, UserDirectory};

/// Attach a username and position to each leaderboard record.
///
/// Without `fetch_missing` only the directory's cache is consulted; with it,
/// every record is resolved in turn. Users that cannot be resolved get the
/// "Unknown"/"0000" placeholder. A record's position is the 1-based index of
/// the first record in `leaderboard` with the same guild and user.
pub async fn compute_leaderboard(
    directory: &dyn UserDirectory,
    leaderboard: &[UserLevel],
    fetch_missing: bool,
) -> Vec<LeaderboardEntry> {
    if leaderboard.is_empty() {
        return Vec::new();
    }

    let mut first_index: HashMap<(&str, &str), u64> = HashMap::with_capacity(leaderboard.len());
    for (idx, record) in leaderboard.iter().enumerate() {
        first_index
            .entry((record.guild_id.as_str(), record.user_id.as_str()))
            .or_insert(idx as u64 + 1);
    }

    let mut computed = Vec::with_capacity(leaderboard.len());
    for record in leaderboard {
        let user = if fetch_missing {
            match directory.resolve(&record.user_id).await {
                Ok(user) => user,
                Err(e) => {
                    debug!("Could not resolve user {}: {:#}", record.user_id, e);
                    DirectoryUser::unknown()
                }
            }
        } else {
            directory
                .cached(&record.user_id)
                .unwrap_or_else(DirectoryUser::unknown)
        };

        let position = first_index
            .get(&(record.guild_id.as_str(), record.user_id.as_str()))
            .copied()
            .unwrap_or(computed.len() as u64 + 1);

        let mut entry_user = record.clone();
        entry_user.position = None;

        computed.push(LeaderboardEntry {
            user: entry_user,
            position,
            username: user.username,
            discriminator: user.discriminator,
        });
    }

    computed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::StaticDirectory;
    use crate::timestamp;

    fn record(user_id: &str, xp: i64) -> UserLevel {
        let mut user = UserLevel::new(user_id, "g", timestamp::now());
        user.xp = xp;
        user
    }

    #[tokio::test]
    async fn test_empty_leaderboard() {
        let dir = StaticDirectory::new();
        assert!(compute_leaderboard(&dir, &[], true).await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_records_share_first_position() {
        let dir = StaticDirectory::new();
        let board = vec![record("a", 30), record("b", 20), record("a", 30)];

        let computed = compute_leaderboard(&dir, &board, false).await;
        let positions: Vec<u64> = computed.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![1, 2, 1]);
    }
}
