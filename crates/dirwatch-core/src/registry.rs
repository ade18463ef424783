//! Per-file scan progress for the watched set

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{DirwatchError, Result};

/// A file currently being watched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedFile {
    /// Base name of the file, unique within the registry
    pub name: String,
    /// Number of lines already examined for the magic text
    pub scanned_lines: usize,
}

impl WatchedFile {
    fn new(name: String) -> Self {
        Self {
            name,
            scanned_lines: 0,
        }
    }
}

/// Tracks the watched set and how far each file has been scanned.
///
/// Names are kept in sorted order so iteration is stable between ticks.
#[derive(Debug, Default)]
pub struct FileRegistry {
    files: BTreeMap<String, WatchedFile>,
}

impl FileRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a file is being watched
    pub fn has(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    /// Start watching a file with zero scanned lines.
    ///
    /// Returns `false` and leaves the existing entry untouched if the file
    /// is already registered.
    pub fn register(&mut self, name: &str) -> bool {
        if self.files.contains_key(name) {
            return false;
        }
        self.files.insert(name.to_string(), WatchedFile::new(name.to_string()));
        true
    }

    /// Stop watching a file, returning its last known state
    pub fn unregister(&mut self, name: &str) -> Result<WatchedFile> {
        self.files
            .remove(name)
            .ok_or_else(|| DirwatchError::NotWatched(name.to_string()))
    }

    /// Number of lines already scanned in `name`
    pub fn progress_of(&self, name: &str) -> Result<usize> {
        self.get(name).map(|f| f.scanned_lines)
    }

    /// Record that `name` has been scanned up to `new_count` lines.
    ///
    /// Progress never moves backwards. A regressive count is a bug in the
    /// caller: debug builds panic, release builds keep the current count.
    pub fn advance(&mut self, name: &str, new_count: usize) -> Result<()> {
        let file = self
            .files
            .get_mut(name)
            .ok_or_else(|| DirwatchError::NotWatched(name.to_string()))?;

        debug_assert!(
            new_count >= file.scanned_lines,
            "scan progress for {} would regress from {} to {}",
            name,
            file.scanned_lines,
            new_count
        );

        file.scanned_lines = file.scanned_lines.max(new_count);
        Ok(())
    }

    /// Restart scanning of `name` from the first line.
    ///
    /// Only used when a file is observed to have fewer lines than were
    /// already scanned (truncated or replaced).
    pub fn reset(&mut self, name: &str) -> Result<()> {
        let file = self
            .files
            .get_mut(name)
            .ok_or_else(|| DirwatchError::NotWatched(name.to_string()))?;
        file.scanned_lines = 0;
        Ok(())
    }

    /// Look up a watched file
    pub fn get(&self, name: &str) -> Result<&WatchedFile> {
        self.files
            .get(name)
            .ok_or_else(|| DirwatchError::NotWatched(name.to_string()))
    }

    /// Names of all watched files
    pub fn names(&self) -> BTreeSet<String> {
        self.files.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
