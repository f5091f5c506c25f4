//! User directory: resolves chat user ids to display names
//!
//! The chat platform client lives outside this crate. Hosts implement
//! [`UserDirectory`] on top of it; [`StaticDirectory`] is a map-backed
//! implementation used by the CLI and tests.

use std::collections::HashMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Display identity of a chat user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub username: String,
    #[serde(default = "default_discriminator")]
    pub discriminator: String,
}

fn default_discriminator() -> String {
    "0".to_string()
}

impl DirectoryUser {
    pub fn new(username: impl Into<String>, discriminator: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            discriminator: discriminator.into(),
        }
    }

    /// Placeholder for users that could not be resolved
    pub fn unknown() -> Self {
        Self::new("Unknown", "0000")
    }
}

/// Lookup capability for chat users
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Non-blocking lookup in whatever the directory already has warm.
    fn cached(&self, user_id: &str) -> Option<DirectoryUser>;

    /// Full lookup. An error means the user is unknown or unreachable.
    async fn resolve(&self, user_id: &str) -> Result<DirectoryUser>;
}

/// Directory backed by a fixed map of known users
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: HashMap<String, DirectoryUser>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user_id: impl Into<String>, user: DirectoryUser) -> Self {
        self.insert(user_id, user);
        self
    }

    pub fn insert(&mut self, user_id: impl Into<String>, user: DirectoryUser) {
        self.users.insert(user_id.into(), user);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl From<HashMap<String, DirectoryUser>> for StaticDirectory {
    fn from(users: HashMap<String, DirectoryUser>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserDirectory for StaticDirectory {
    fn cached(&self, user_id: &str) -> Option<DirectoryUser> {
        self.users.get(user_id).cloned()
    }

    async fn resolve(&self, user_id: &str) -> Result<DirectoryUser> {
        match self.users.get(user_id) {
            Some(user) => Ok(user.clone()),
            None => bail!("Unknown user: {}", user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_directory_resolve() {
        let dir = StaticDirectory::new().with_user("1", DirectoryUser::new("alice", "0001"));

        assert_eq!(dir.cached("1").unwrap().username, "alice");
        assert!(dir.cached("2").is_none());
        assert_eq!(dir.resolve("1").await.unwrap().discriminator, "0001");

        let err = dir.resolve("2").await.unwrap_err();
        assert!(err.to_string().contains("Unknown user"));
    }

    #[test]
    fn test_unknown_placeholder() {
        let unknown = DirectoryUser::unknown();
        assert_eq!(unknown.username, "Unknown");
        assert_eq!(unknown.discriminator, "0000");
    }
}
