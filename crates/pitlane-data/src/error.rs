//! Error types for reference-data lookups.

/// Errors raised when a lookup against the static tables misses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    /// No driver with the given code exists.
    #[error("Driver not found")]
    DriverNotFound(String),

    /// No session with the given identifier exists.
    #[error("Session not found")]
    SessionNotFound(String),
}
