//! Course catalog service
//!
//! Owns one ordered index of courses and fills it from course files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::loader::parse_catalog;
use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{Course, InOrder, InsertOutcome, OrderedIndex};
use crate::infrastructure::traits::FileSystem;

/// Summary of one successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub path: PathBuf,
    /// New nodes added to the index
    pub inserted: usize,
    /// Existing records overwritten (duplicate policy `overwrite`)
    pub replaced: usize,
    /// Records dropped as duplicates (duplicate policy `reject`)
    pub rejected: usize,
    /// 1-based line numbers skipped as malformed
    pub skipped_lines: Vec<usize>,
}

/// Course catalog backed by an [`OrderedIndex`].
pub struct CatalogService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
    index: OrderedIndex<Course>,
}

impl CatalogService {
    /// Create an empty catalog.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        let index = OrderedIndex::with_policy(settings.duplicates);
        Self {
            fs,
            settings,
            index,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Resolve a user-supplied file argument: the default token (or nothing)
    /// selects the configured default file.
    pub fn resolve_path(&self, input: Option<&str>) -> PathBuf {
        match input.map(str::trim) {
            None | Some("") => self.settings.default_file.clone(),
            Some(token) if token == self.settings.default_token => {
                self.settings.default_file.clone()
            }
            Some(path) => PathBuf::from(path),
        }
    }

    /// Load a course file into the catalog.
    ///
    /// The file is read and parsed completely before the first insert, so on
    /// any error the catalog is unchanged. Loading several files accumulates.
    #[instrument(skip(self))]
    pub fn load(&mut self, path: &Path) -> ApplicationResult<LoadReport> {
        debug!("load: path={}", path.display());
        let content = self.fs.read_to_string(path).with_path_context(path)?;

        let parsed = parse_catalog(
            &content,
            self.settings.delimiter,
            self.settings.on_malformed,
            path,
        )?;

        let mut report = LoadReport {
            path: path.to_path_buf(),
            skipped_lines: parsed.skipped_lines,
            ..LoadReport::default()
        };
        for course in parsed.courses {
            match self.index.insert(course) {
                InsertOutcome::Inserted => report.inserted += 1,
                InsertOutcome::Replaced => report.replaced += 1,
                InsertOutcome::Rejected => report.rejected += 1,
            }
        }

        debug!(
            "load: inserted={} replaced={} rejected={} total={}",
            report.inserted,
            report.replaced,
            report.rejected,
            self.index.len()
        );
        Ok(report)
    }

    /// All courses in ascending course-number order.
    pub fn courses(&self) -> InOrder<'_, Course> {
        self.index.iter()
    }

    /// Look up a course by exact (case-sensitive) course number.
    #[instrument(level = "debug", skip(self))]
    pub fn find(&self, course_number: &str) -> Option<&Course> {
        self.index.search(course_number)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Structure of the underlying tree.
    pub fn shape(&self) -> Tree<String> {
        self.index.shape()
    }

    pub fn index(&self) -> &OrderedIndex<Course> {
        &self.index
    }
}
