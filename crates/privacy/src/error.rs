//! Privacy Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A privacy tooling error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for export and erase operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an export or erase failure.
///
/// Store failures are never handled here: they are raised as
/// [`ErrorKind::Store`] with the store's own error tree as the child, and the
/// caller decides whether to retry.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A query or metadata read against the record store failed.
    #[display("record store error")]
    Store,
    /// A registered exporter failed; `retryable` carries over from its error.
    #[display("exporter failed: {id}")]
    Exporter { id: String, retryable: bool },
    /// A registered eraser failed; `retryable` carries over from its error.
    #[display("eraser failed: {id}")]
    Eraser { id: String, retryable: bool },
    /// An exporter kept reporting further pages past the configured limit.
    #[display("exporter {_0} did not finish within {_1} pages")]
    PageLimit(#[error(not(source))] String, u32),
    #[display("no exporter or eraser registered as: {_0}")]
    NotRegistered(#[error(not(source))] String),
}

impl ErrorKind {
    /// Raise a registered exporter's error, keeping it as a child in the
    /// error tree.
    #[track_caller]
    pub fn exporter(id: impl Into<String>, err: Error) -> Error {
        let retryable = err.is_retryable();
        err.raise(ErrorKind::Exporter { id: id.into(), retryable })
    }

    /// Raise a registered eraser's error, keeping it as a child in the error
    /// tree.
    #[track_caller]
    pub fn eraser(id: impl Into<String>, err: Error) -> Error {
        let retryable = err.is_retryable();
        err.raise(ErrorKind::Eraser { id: id.into(), retryable })
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Store => true,
            Self::Exporter { retryable, .. } | Self::Eraser { retryable, .. } => *retryable,
            Self::PageLimit(..) | Self::NotRegistered(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Store.to_string(), "record store error");
        assert_eq!(
            ErrorKind::PageLimit("wcb_speaker".to_string(), 3).to_string(),
            "exporter wcb_speaker did not finish within 3 pages"
        );
        let kind = ErrorKind::Eraser { id: "wcb_speaker".to_string(), retryable: false };
        assert_eq!(kind.to_string(), "eraser failed: wcb_speaker");
    }

    #[test]
    fn test_registered_errors_keep_retryability() {
        let err = ErrorKind::exporter("wcb_speaker", exn::Exn::from(ErrorKind::Store));
        assert!(matches!(&*err, ErrorKind::Exporter { id, retryable: true } if id == "wcb_speaker"));
        assert!(err.is_retryable());
        let err = ErrorKind::eraser("wcb_speaker", exn::Exn::from(ErrorKind::NotRegistered("x".to_string())));
        assert!(!err.is_retryable());
    }
}
