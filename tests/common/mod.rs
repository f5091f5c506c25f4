//! Shared test utilities for store integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use guild_xp::{Outcome, UserLevel, XpStore};
use tempfile::TempDir;

/// A configured store backed by a database in a temporary directory
pub struct TestStore {
    pub dir: TempDir,
    pub store: XpStore,
}

impl TestStore {
    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("xp.db")
    }

    /// A second raw connection to the same database, for inspecting rows
    /// and planting faults
    pub fn raw_conn(&self) -> rusqlite::Connection {
        rusqlite::Connection::open(self.db_path()).expect("Failed to open raw connection")
    }

    pub fn count(&self, sql: &str) -> i64 {
        self.raw_conn()
            .query_row(sql, [], |r| r.get(0))
            .expect("Failed to run count query")
    }
}

/// Creates a store in a fresh temporary directory
pub fn create_test_store() -> TestStore {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = XpStore::open(dir.path().join("xp.db")).expect("Failed to open store");
    TestStore { dir, store }
}

/// Gives each `(user, xp)` pair a record in `guild`
pub fn seed_guild(store: &XpStore, guild_id: &str, users: &[(&str, i64)]) {
    let levels = store.levels().expect("store configured");
    for (user_id, xp) in users {
        let outcome = levels
            .set_xp(user_id, guild_id, *xp)
            .expect("valid arguments");
        assert!(outcome.is_value(), "seeding {} failed", user_id);
    }
}

/// Unwraps the value of an outcome, panicking with the variant otherwise
pub fn expect_value<T: std::fmt::Debug>(outcome: Outcome<T>) -> T {
    match outcome {
        Outcome::Value(v) => v,
        other => panic!("expected a value, got {:?}", other),
    }
}

pub fn fetch(store: &XpStore, user_id: &str, guild_id: &str) -> UserLevel {
    expect_value(
        store
            .levels()
            .expect("store configured")
            .fetch(user_id, guild_id, false)
            .expect("valid arguments"),
    )
}
