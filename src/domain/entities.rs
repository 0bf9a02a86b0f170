//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Records stored in an [`OrderedIndex`](crate::domain::OrderedIndex) expose their key through this trait.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// A course offered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier, e.g. "CSCI200"
    pub course_number: String,
    /// Display name
    pub course_name: String,
    /// Prerequisite course numbers in the order they were listed
    pub prerequisites: Vec<String>,
}

impl Course {
    pub fn new(course_number: impl Into<String>, course_name: impl Into<String>) -> Self {
        Self {
            course_number: course_number.into(),
            course_name: course_name.into(),
            prerequisites: Vec::new(),
        }
    }

    pub fn with_prerequisites<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites
            .extend(prerequisites.into_iter().map(Into::into));
        self
    }

    pub fn has_prerequisites(&self) -> bool {
        !self.prerequisites.is_empty()
    }

    /// Build a course from the fields of one delimited record.
    ///
    /// Field 0 is the course number, field 1 the name, every further
    /// non-blank field a prerequisite. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    /// `DomainError::MalformedRecord` if fewer than two fields are given.
    pub fn from_fields(fields: &[&str]) -> DomainResult<Self> {
        let [number, name, rest @ ..] = fields else {
            return Err(DomainError::MalformedRecord {
                fields: fields.len(),
            });
        };

        let course = Course::new(number.trim(), name.trim()).with_prerequisites(
            rest.iter()
                .map(|field| field.trim())
                .filter(|field| !field.is_empty()),
        );
        Ok(course)
    }
}

impl Keyed for Course {
    fn key(&self) -> &str {
        &self.course_number
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.course_number, self.course_name)
    }
}
