use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::{DirwatchError, Result};

/// Lists the files of a single directory whose names end with an extension
pub struct DirectoryLister {
    root: PathBuf,
    extension: String,
}

impl DirectoryLister {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    /// Names of all matching files currently in the directory.
    ///
    /// The listing is all-or-nothing: any error while reading the directory
    /// fails the whole call so callers never act on a partial view.
    pub fn list(&self) -> Result<BTreeSet<String>> {
        let read_dir = std::fs::read_dir(&self.root).map_err(|e| self.access_error(e))?;

        let mut names = BTreeSet::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| self.access_error(e))?;

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    tracing::debug!("Skipping non UTF-8 file name: {:?}", raw);
                    continue;
                }
            };

            if !self.matches(&name) {
                continue;
            }

            // Follows symlinks, so a link to a directory is skipped too
            if entry.path().is_dir() {
                tracing::trace!("Skipping directory {}", name);
                continue;
            }

            names.insert(name);
        }

        Ok(names)
    }

    /// Exact, case-sensitive suffix match
    pub fn matches(&self, name: &str) -> bool {
        name.ends_with(&self.extension)
    }

    fn access_error(&self, source: std::io::Error) -> DirwatchError {
        DirwatchError::DirectoryAccess {
            path: self.root.clone(),
            source,
        }
    }
}
