//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent record-level violations.
/// These are independent of where the record came from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed course record: expected at least 2 fields, found {fields}")]
    MalformedRecord { fields: usize },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
