//! Domain layer: entities and the ordered index
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod entities;
pub mod error;
pub mod index;

pub use entities::{Course, Keyed};
pub use error::{DomainError, DomainResult};
pub use index::{DuplicatePolicy, InOrder, InsertOutcome, OrderedIndex};
