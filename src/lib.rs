//! In-memory course catalog.
//!
//! Course records are loaded from delimited text files into an
//! [`OrderedIndex`](domain::OrderedIndex), an unbalanced binary search tree
//! keyed by course number, then listed in ascending order or looked up by
//! exact course number.
//!
//! Layers, innermost first: [`domain`], [`application`], [`infrastructure`], [`cli`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::services::{CatalogService, LoadReport};
pub use domain::{Course, DuplicatePolicy, OrderedIndex};
