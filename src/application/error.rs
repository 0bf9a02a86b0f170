//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors add load-level context to I/O and domain failures.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("unable to open {}: {source}", .path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no data was found in {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("incorrect file format in {} at line {line_number}: {content:?}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line_number: usize,
        content: String,
        #[source]
        source: DomainError,
    },

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
