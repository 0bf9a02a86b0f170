//! Course file parsing
//!
//! A course file holds one record per non-blank line:
//! `NUMBER<d>NAME[<d>PREREQ]...` where `<d>` is a single delimiter character.
//! The whole file is parsed before anything reaches the index, so an aborted
//! load leaves the index untouched.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Course, DomainError};

/// What to do with a line that has fewer than two fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedLinePolicy {
    /// Reject the whole file.
    #[default]
    Abort,
    /// Drop the line with a warning and keep going.
    Skip,
}

impl fmt::Display for MalformedLinePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedLinePolicy::Abort => f.write_str("abort"),
            MalformedLinePolicy::Skip => f.write_str("skip"),
        }
    }
}

/// Courses parsed from one file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCatalog {
    pub courses: Vec<Course>,
    /// 1-based line numbers dropped under `MalformedLinePolicy::Skip`
    pub skipped_lines: Vec<usize>,
}

/// Split a line on `delimiter`.
///
/// A delimiter at the very end of the line does not open a new field:
/// `"CS101,"` is one field, `"CS101,,"` is two.
pub fn split_fields(line: &str, delimiter: char) -> Vec<&str> {
    let mut fields: Vec<&str> = line.split(delimiter).collect();
    if fields.len() > 1 && fields.last().is_some_and(|last| last.is_empty()) {
        fields.pop();
    }
    fields
}

/// Parse a single line into a course.
pub fn parse_line(line: &str, delimiter: char) -> Result<Course, DomainError> {
    Course::from_fields(&split_fields(line, delimiter))
}

/// Parse the full content of a course file.
///
/// # Errors
/// - `EmptyFile` if there is no non-blank line
/// - `MalformedLine` for the first short line under `MalformedLinePolicy::Abort`
pub fn parse_catalog(
    content: &str,
    delimiter: char,
    policy: MalformedLinePolicy,
    path: &Path,
) -> ApplicationResult<ParsedCatalog> {
    let mut parsed = ParsedCatalog::default();
    let mut data_lines = 0usize;

    for (i, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        data_lines += 1;
        let line_number = i + 1;

        match parse_line(line, delimiter) {
            Ok(course) => parsed.courses.push(course),
            Err(e) => match policy {
                MalformedLinePolicy::Abort => {
                    debug!("parse_catalog: aborting at line {}: {}", line_number, e);
                    return Err(ApplicationError::MalformedLine {
                        path: path.to_path_buf(),
                        line_number,
                        content: line.to_string(),
                        source: e,
                    });
                }
                MalformedLinePolicy::Skip => {
                    warn!("{}:{}: skipping line ({})", path.display(), line_number, e);
                    parsed.skipped_lines.push(line_number);
                }
            },
        }
    }

    if data_lines == 0 {
        return Err(ApplicationError::EmptyFile(path.to_path_buf()));
    }

    debug!(
        "parse_catalog: {} courses, {} skipped",
        parsed.courses.len(),
        parsed.skipped_lines.len()
    );
    Ok(parsed)
}
