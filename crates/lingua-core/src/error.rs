//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures surfaced by the blog facade.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} '{key}'")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn post_not_found(slug: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Post",
            key: slug.into(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("I/O failed: {0}")]
    Io(String),

    #[error("Malformed record: {0}")]
    Serialization(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Stale version: record is no longer at version {expected}")]
    StaleVersion { expected: u64 },
}

impl From<std::io::Error> for RepoError {
    fn from(err: std::io::Error) -> Self {
        RepoError::Io(err.to_string())
    }
}
