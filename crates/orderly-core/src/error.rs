//! Core error types for orderly.
//!
//! [`OrderlyError`] covers caller mistakes (usage errors), lookups that found
//! nothing, backend failures and configuration problems. Every crate in the
//! workspace returns [`OrderlyResult`].

use thiserror::Error;

/// The error type for all orderly operations.
#[derive(Error, Debug)]
pub enum OrderlyError {
    // ── Usage ────────────────────────────────────────────────────────

    /// The caller violated an operation's contract: an unsaved record was
    /// passed to a positional operation, two records from different groups
    /// were interleaved, or a group key did not match the model's fields.
    #[error("Usage error: {0}")]
    Usage(String),

    // ── Lookups ──────────────────────────────────────────────────────

    /// A lookup expected exactly one result but found none.
    #[error("Object does not exist: {0}")]
    DoesNotExist(String),

    /// A lookup expected exactly one result but found several.
    #[error("Multiple objects returned when one expected: {0}")]
    MultipleObjectsReturned(String),

    // ── Database ─────────────────────────────────────────────────────

    /// A generic database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A database integrity constraint was violated.
    #[error("Integrity error: {0}")]
    IntegrityError(String),

    /// An operational database error (connection failure, etc.).
    #[error("Operational error: {0}")]
    OperationalError(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── Serialization ────────────────────────────────────────────────

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl OrderlyError {
    /// Returns `true` for errors caused by the caller rather than the store.
    ///
    /// Usage errors are never worth retrying.
    pub const fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Returns `true` if a lookup found no matching object.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::DoesNotExist(_))
    }
}

/// A convenience type alias for `Result<T, OrderlyError>`.
pub type OrderlyResult<T> = Result<T, OrderlyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_display() {
        let err = OrderlyError::Usage("Cannot order unsaved items.".into());
        assert_eq!(err.to_string(), "Usage error: Cannot order unsaved items.");
        assert!(err.is_usage());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_does_not_exist_display() {
        let err = OrderlyError::DoesNotExist("record 7".into());
        assert_eq!(err.to_string(), "Object does not exist: record 7");
        assert!(err.is_not_found());
        assert!(!err.is_usage());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: OrderlyError = io_err.into();
        assert!(matches!(err, OrderlyError::IoError(_)));
        assert!(err.to_string().contains("file missing"));
    }
}
