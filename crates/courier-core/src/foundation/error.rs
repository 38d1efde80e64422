//! Error types for the Courier core.
//!
//! The matcher and the registry are total: malformed or unexpected types
//! yield a non-match, never an error. The only fallible surface in this crate
//! is typed payload extraction.

use thiserror::Error;

/// Errors that can occur when extracting a concrete type from a type-erased
/// message.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// The message's concrete type does not match the requested type.
    #[error("message type mismatch: expected '{expected}', got '{got}'")]
    TypeMismatch {
        /// Requested type name.
        expected: &'static str,
        /// Actual type name.
        got: &'static str,
    },
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
