//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Covers deterministic business failures (validation, missing records,
/// duplicates) plus a catch-all for failures of the backing store. Mapping to
/// transport status codes happens at the HTTP boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A single field failed validation.
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A record looked up by some key does not exist.
    #[error("{resource} not found with the given input data {field} : '{value}'")]
    NotFound {
        resource: &'static str,
        field: &'static str,
        value: String,
    },

    /// A record with the same natural key already exists.
    #[error("{0}")]
    AlreadyExists(String),

    /// Anything else (store failure, poisoned lock, ...).
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            field,
            value: value.into(),
        }
    }

    pub fn already_exists(msg: impl Into<String>) -> Self {
        Self::AlreadyExists(msg.into())
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }
}
