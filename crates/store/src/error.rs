//! Record Store Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A record store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for record store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The backing database could not be reached or rejected a statement.
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A value could not be converted between its stored and modelled forms.
    #[display("invalid record data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    /// The query specification cannot be executed (e.g. zero page size).
    #[display("invalid query: {_0}")]
    InvalidQuery(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Database.to_string(), "database error");
        assert_eq!(ErrorKind::InvalidData("record id").to_string(), "invalid record data: record id");
        assert_eq!(ErrorKind::InvalidQuery("page size").to_string(), "invalid query: page size");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Database.is_retryable());
        assert!(!ErrorKind::Migration.is_retryable());
        assert!(!ErrorKind::InvalidQuery("page size").is_retryable());
    }
}
