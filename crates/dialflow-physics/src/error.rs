//! Error types for the physics crate.

use thiserror::Error;

/// Errors raised while constructing physics components.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// Emitter threshold must be a positive finite number.
    #[error("Invalid emitter threshold: {0}")]
    InvalidThreshold(f64),
}

/// Result alias for physics construction.
pub type PhysicsResult<T> = Result<T, PhysicsError>;
