//! Timestamp helpers for the `last_updated` columns
//!
//! Rows carry SQLite `CURRENT_TIMESTAMP` text ("YYYY-MM-DD HH:MM:SS", UTC).
//! Values written by the crate use the same format so both sources parse alike.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

const SQLITE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current time truncated to whole seconds (the column precision).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Format a timestamp for storage.
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.format(SQLITE_FORMAT).to_string()
}

/// Parse a stored timestamp.
///
/// Accepts the SQLite format and RFC 3339. Returns `None` for anything else.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, SQLITE_FORMAT) {
        return Some(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
