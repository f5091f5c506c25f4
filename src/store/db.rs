//! SQLite connection shared by every store handle

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, Result};
use rusqlite::Connection;

use crate::error::XpError;

/// Default time a statement waits on a locked database
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Long-lived database connection
#[derive(Clone)]
pub struct XpDb {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl XpDb {
    /// Open the database at `path` in WAL mode with foreign keys enforced.
    ///
    /// The schema must already exist (see [`super::schema::ensure_schema`]).
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, XpError> {
        let conn = Connection::open(path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(busy_timeout)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lock the connection
    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("XP database lock poisoned"))
    }
}
