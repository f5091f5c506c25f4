//! guild-xp - per-guild XP and levels for chat bots
//!
//! Tracks experience points per `(user, guild)` in a SQLite database, derives
//! levels from XP (`level = floor(0.1 * sqrt(xp))`), keeps level -> role
//! reward mappings and answers leaderboard queries.
//!
//! ## Flow
//!
//! The host (a chat bot) configures one [`XpStore`] at startup and then
//! calls it per event:
//!
//! 1. **Per message**: [`LevelStore::append_xp`] returns `true` on level-up.
//! 2. **Per command**: fetch records, leaderboards and role rewards.
//! 3. **Housekeeping**: [`GuildMaintenance::clean_database`] drops users the
//!    chat platform no longer knows, [`GuildMaintenance::delete_guild`]
//!    removes a guild entirely.
//!
//! Name lookups go through the [`UserDirectory`] trait, implemented by the
//! host on top of its chat client.

pub mod config;
pub mod directory;
pub mod error;
pub mod leveling;
pub mod store;
pub mod timestamp;

pub use directory::{DirectoryUser, StaticDirectory, UserDirectory};
pub use error::{Outcome, XpError};
pub use leveling::{level_for, xp_for, xp_for_str, LevelProgress};
pub use store::{
    compute_leaderboard, ensure_schema, parse_amount, GuildMaintenance, LeaderboardEntry,
    LevelStore, RewardGroup, RewardStore, RoleReward, UserLevel, XpStore,
};
