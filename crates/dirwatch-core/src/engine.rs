//! Incremental scanning of a watched directory

use std::collections::BTreeSet;
use std::path::Path;

use crate::config::WatchConfig;
use crate::error::{DirwatchError, Result};
use crate::event::{ErrorScope, ScanEvent};
use crate::fs::{scan_lines, DirectoryLister};
use crate::registry::FileRegistry;

/// Owns the watched set and reports what changed on every tick.
///
/// Each call to [`ScanEngine::reconcile_and_scan`] runs to completion and
/// never fails: directory and file problems are returned as
/// [`ScanEvent::ScanError`] events.
#[derive(Debug, Default)]
pub struct ScanEngine {
    registry: FileRegistry,
}

impl ScanEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one tick using the directory, extension and magic text from config
    pub fn tick(&mut self, config: &WatchConfig) -> Vec<ScanEvent> {
        self.reconcile_and_scan(&config.directory, &config.extension, &config.magic)
    }

    /// Sync the watched set with the directory and search the unscanned
    /// tail of every watched file for `magic`.
    pub fn reconcile_and_scan(
        &mut self,
        directory: &Path,
        extension: &str,
        magic: &str,
    ) -> Vec<ScanEvent> {
        let lister = DirectoryLister::new(directory, extension);
        let current = match lister.list() {
            Ok(names) => names,
            Err(e) => {
                tracing::debug!("Skipping tick: {}", e);
                return vec![error_event(directory, ErrorScope::Directory, e)];
            }
        };

        let mut events = self.reconcile(&current);

        let mut matches = 0;
        let mut errors = 0;
        for name in self.registry.names() {
            let path = directory.join(&name);
            match self.scan_file(&path, &name, magic) {
                Ok(found) => {
                    matches += found.len();
                    events.extend(found);
                }
                Err(e) => {
                    tracing::debug!("Leaving progress of {} unchanged: {}", name, e);
                    errors += 1;
                    events.push(error_event(&path, ErrorScope::File, e));
                }
            }
        }

        tracing::debug!(
            "Tick over {}: {} watched, {} matches, {} errors",
            directory.display(),
            self.registry.len(),
            matches,
            errors
        );

        events
    }

    /// Read-only view of the watched set
    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    /// Apply additions, then removals, so the registry mirrors `current`
    fn reconcile(&mut self, current: &BTreeSet<String>) -> Vec<ScanEvent> {
        let mut events = Vec::new();

        for name in current {
            if self.registry.register(name) {
                events.push(ScanEvent::FileAppeared { name: name.clone() });
            }
        }

        let known = self.registry.names();
        for name in known.difference(current) {
            if self.registry.unregister(name).is_ok() {
                events.push(ScanEvent::FileRemoved { name: name.clone() });
            }
        }

        events
    }

    /// Search the unscanned tail of one file and record the new progress.
    ///
    /// Progress is only touched once the whole file was read.
    fn scan_file(&mut self, path: &Path, name: &str, magic: &str) -> Result<Vec<ScanEvent>> {
        let start = self.registry.progress_of(name)?;
        let scan = scan_lines(path, magic, start)?;

        if scan.truncated {
            tracing::debug!(
                "{} shrank from {} to {} lines, rescanning from the top",
                name,
                start,
                scan.total_lines
            );
            self.registry.reset(name)?;
        }
        self.registry.advance(name, scan.total_lines)?;

        Ok(scan
            .matches
            .into_iter()
            .map(|line| ScanEvent::MatchFound {
                name: name.to_string(),
                line,
            })
            .collect())
    }
}

fn error_event(path: &Path, scope: ErrorScope, error: DirwatchError) -> ScanEvent {
    let cause = match &error {
        DirwatchError::DirectoryAccess { source, .. }
        | DirwatchError::FileAccess { source, .. } => source.to_string(),
        other => other.to_string(),
    };

    ScanEvent::ScanError {
        path: path.to_path_buf(),
        scope,
        cause,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn append(dir: &Path, name: &str, content: &str) {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(dir.join(name))
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    fn appeared(name: &str) -> ScanEvent {
        ScanEvent::FileAppeared {
            name: name.to_string(),
        }
    }

    fn found(name: &str, line: usize) -> ScanEvent {
        ScanEvent::MatchFound {
            name: name.to_string(),
            line,
        }
    }

    #[test]
    fn test_append_reports_only_new_match() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        write(dir, "a.txt", "hello\nMAGIC here\nworld\n");

        let mut engine = ScanEngine::new();
        let events = engine.reconcile_and_scan(dir, ".txt", "MAGIC");
        assert_eq!(events, vec![appeared("a.txt"), found("a.txt", 2)]);
        assert_eq!(engine.registry().progress_of("a.txt").unwrap(), 3);

        append(dir, "a.txt", "MAGIC again\n");
        let events = engine.reconcile_and_scan(dir, ".txt", "MAGIC");
        assert_eq!(events, vec![found("a.txt", 4)]);
        assert_eq!(engine.registry().progress_of("a.txt").unwrap(), 4);
    }

    #[test]
    fn test_unchanged_directory_is_quiet() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        write(dir, "a.txt", "MAGIC\nMAGIC\n");

        let mut engine = ScanEngine::new();
        assert_eq!(engine.reconcile_and_scan(dir, ".txt", "MAGIC").len(), 3);
        assert!(engine.reconcile_and_scan(dir, ".txt", "MAGIC").is_empty());
    }

    #[test]
    fn test_empty_magic_reports_each_line_once() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        write(dir, "a.txt", "one\ntwo\n");

        let mut engine = ScanEngine::new();
        let events = engine.reconcile_and_scan(dir, ".txt", "");
        assert_eq!(
            events,
            vec![appeared("a.txt"), found("a.txt", 1), found("a.txt", 2)]
        );

        append(dir, "a.txt", "three\n");
        let events = engine.reconcile_and_scan(dir, ".txt", "");
        assert_eq!(events, vec![found("a.txt", 3)]);
        assert!(engine.reconcile_and_scan(dir, ".txt", "").is_empty());
    }

    #[test]
    fn test_removal_event() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        write(dir, "a.txt", "x\n");
        write(dir, "b.txt", "y\n");

        let mut engine = ScanEngine::new();
        engine.reconcile_and_scan(dir, ".txt", "MAGIC");

        std::fs::remove_file(dir.join("a.txt")).unwrap();
        let events = engine.reconcile_and_scan(dir, ".txt", "MAGIC");
        assert_eq!(
            events,
            vec![ScanEvent::FileRemoved {
                name: "a.txt".to_string()
            }]
        );
        assert!(!engine.registry().has("a.txt"));
        assert!(engine.registry().has("b.txt"));
    }

    #[test]
    fn test_truncated_file_is_rescanned() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path();
        write(dir, "a.txt", "one\ntwo\nthree\nfour\n");

        let mut engine = ScanEngine::new();
        engine.reconcile_and_scan(dir, ".txt", "MAGIC");
        assert_eq!(engine.registry().progress_of("a.txt").unwrap(), 4);

        write(dir, "a.txt", "MAGIC\n");
        let events = engine.reconcile_and_scan(dir, ".txt", "MAGIC");
        assert_eq!(events, vec![found("a.txt", 1)]);
        assert_eq!(engine.registry().progress_of("a.txt").unwrap(), 1);
    }

    #[test]
    fn test_directory_error_leaves_registry_alone() {
        let temp_dir = tempdir().unwrap();
        let dir = temp_dir.path().join("watched");
        std::fs::create_dir(&dir).unwrap();
        write(&dir, "a.txt", "x\n");

        let mut engine = ScanEngine::new();
        engine.reconcile_and_scan(&dir, ".txt", "MAGIC");

        let moved = temp_dir.path().join("moved");
        std::fs::rename(&dir, &moved).unwrap();

        let events = engine.reconcile_and_scan(&dir, ".txt", "MAGIC");
        assert_eq!(events.len(), 1);
        assert!(events[0].is_directory_error());
        assert!(engine.registry().has("a.txt"));

        // Recovers once the directory is back
        std::fs::rename(&moved, &dir).unwrap();
        assert!(engine.reconcile_and_scan(&dir, ".txt", "MAGIC").is_empty());
    }

    #[test]
    fn test_tick_uses_config() {
        let temp_dir = tempdir().unwrap();
        write(temp_dir.path(), "notes.md", "secret\n");

        let config = WatchConfig {
            directory: temp_dir.path().to_path_buf(),
            extension: ".md".to_string(),
            magic: "secret".to_string(),
            ..WatchConfig::default()
        };

        let mut engine = ScanEngine::new();
        let events = engine.tick(&config);
        assert_eq!(events, vec![appeared("notes.md"), found("notes.md", 1)]);
    }
}
