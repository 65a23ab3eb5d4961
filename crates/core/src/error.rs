//! Domain error model.

use thiserror::Error;

/// Deterministic business failure: the same input always fails the same way.
///
/// Storage and transport failures are not represented here; each layer above
/// has its own error type and maps these variants onto it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Missing or malformed input. The message is safe to show to the caller.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier did not parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// A required field was absent or blank.
    pub fn missing(field: &str) -> Self {
        Self::Validation(format!("{field} is required"))
    }

    /// The caller-facing message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(msg) | Self::InvalidId(msg) => msg,
        }
    }
}
