//! Error types for guild-xp
//!
//! Only two kinds of failure escape an operation as `Err`: bad arguments
//! (caller bugs) and setup problems. Storage failures that happen while an
//! operation runs are logged and folded into [`Outcome`] instead.

use thiserror::Error;

/// Errors returned to the caller of a store operation.
#[derive(Debug, Error)]
pub enum XpError {
    /// A required argument was missing, empty, zero or not a number.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A numeric argument was outside the accepted range.
    #[error("Out of range: {0}")]
    OutOfRange(String),

    /// An operation was attempted before `XpStore::configure`.
    #[error("XP store not configured: call configure() with a database path first")]
    NotConfigured,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl XpError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRange(msg.into())
    }
}

/// Result of a storage-touching operation.
///
/// The negative variants are all "nothing came back" to a caller that only
/// wants the value (see [`Outcome::into_option`]), but stay distinguishable
/// for callers that care why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The operation produced a value.
    Value(T),
    /// The targeted row does not exist.
    NotFound,
    /// A create operation collided with an existing row.
    Conflict,
    /// The database failed; the error has already been logged.
    StorageError,
}

impl<T> Outcome<T> {
    /// Collapse every negative variant into `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Outcome::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Outcome::StorageError)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Value(v) => Outcome::Value(f(v)),
            Outcome::NotFound => Outcome::NotFound,
            Outcome::Conflict => Outcome::Conflict,
            Outcome::StorageError => Outcome::StorageError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_option_collapses_negatives() {
        assert_eq!(Outcome::Value(3).into_option(), Some(3));
        assert_eq!(Outcome::<i32>::NotFound.into_option(), None);
        assert_eq!(Outcome::<i32>::Conflict.into_option(), None);
        assert_eq!(Outcome::<i32>::StorageError.into_option(), None);
    }

    #[test]
    fn test_map_keeps_variant() {
        assert_eq!(Outcome::Value(2).map(|v| v * 10), Outcome::Value(20));
        assert_eq!(Outcome::<i32>::Conflict.map(|v| v * 10), Outcome::Conflict);
        assert!(Outcome::<i32>::StorageError.map(|v| v + 1).is_storage_error());
    }

    #[test]
    fn test_error_messages() {
        let err = XpError::invalid("user id was not provided");
        assert_eq!(err.to_string(), "Invalid argument: user id was not provided");
        assert!(XpError::NotConfigured.to_string().contains("not configured"));
    }
}
