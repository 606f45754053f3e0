//! Error types for report decoding and mapping configuration.

use thiserror::Error;

/// Errors returned by [`decode`](crate::decode).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The report length changed within a session.
    ///
    /// The diff state of the session is no longer meaningful; the owner of the
    /// device lifecycle should treat this like a reconnect.
    #[error("Report length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Length of the stored previous report.
        expected: usize,
        /// Length of the rejected report.
        actual: usize,
    },
}

/// Result alias for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors raised while parsing a serialized mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// A mapping key is neither `"<index>"` nor `"<index>:<value>"`.
    #[error("Invalid mapping key '{0}': expected \"<index>\" or \"<index>:<value>\"")]
    InvalidKey(String),

    /// A byte value in an exact button key is outside `0..=255`.
    #[error("Invalid byte value in mapping key '{0}'")]
    InvalidValue(String),

    /// A mapped name is empty.
    #[error("Empty name for mapping key '{0}'")]
    EmptyName(String),
}
