use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Whether a scan error concerned the whole directory or a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorScope {
    Directory,
    File,
}

/// Something observed during a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    /// A matching file showed up in the directory
    FileAppeared { name: String },
    /// A previously watched file is gone
    FileRemoved { name: String },
    /// The magic text was found on a (1-based) line
    MatchFound { name: String, line: usize },
    /// The directory or a file could not be read
    ScanError {
        path: PathBuf,
        scope: ErrorScope,
        cause: String,
    },
}

impl ScanEvent {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ScanError { .. })
    }

    pub fn is_directory_error(&self) -> bool {
        matches!(
            self,
            Self::ScanError {
                scope: ErrorScope::Directory,
                ..
            }
        )
    }

    /// File name the event refers to (None for directory errors)
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::FileAppeared { name }
            | Self::FileRemoved { name }
            | Self::MatchFound { name, .. } => Some(name.as_str()),
            Self::ScanError {
                path,
                scope: ErrorScope::File,
                ..
            } => path.file_name().and_then(|n| n.to_str()),
            Self::ScanError { .. } => None,
        }
    }

    /// Format as a log line, naming the magic text for matches
    pub fn format_text(&self, magic: &str) -> String {
        match self {
            Self::MatchFound { name, line } => {
                format!("{:?} found in {} on line {}", magic, name, line)
            }
            other => other.to_string(),
        }
    }

    /// Format as a single-line JSON object
    pub fn format_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileAppeared { name } => write!(f, "Found file: {}", name),
            Self::FileRemoved { name } => write!(f, "File {} has been removed", name),
            Self::MatchFound { name, line } => write!(f, "Match in {} on line {}", name, line),
            Self::ScanError { path, scope, cause } => {
                let what = match scope {
                    ErrorScope::Directory => "directory",
                    ErrorScope::File => "file",
                };
                write!(f, "Cannot scan {} {}: {}", what, path.display(), cause)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_text() {
        let event = ScanEvent::MatchFound {
            name: "a.txt".to_string(),
            line: 2,
        };
        assert_eq!(event.format_text("MAGIC"), "\"MAGIC\" found in a.txt on line 2");

        let appeared = ScanEvent::FileAppeared {
            name: "a.txt".to_string(),
        };
        assert_eq!(appeared.format_text("MAGIC"), "Found file: a.txt");
    }

    #[test]
    fn test_format_json() {
        let event = ScanEvent::MatchFound {
            name: "a.txt".to_string(),
            line: 4,
        };
        let value: serde_json::Value = serde_json::from_str(&event.format_json()).unwrap();
        assert_eq!(value["event"], "match_found");
        assert_eq!(value["name"], "a.txt");
        assert_eq!(value["line"], 4);

        let error = ScanEvent::ScanError {
            path: PathBuf::from("/nope"),
            scope: ErrorScope::Directory,
            cause: "not found".to_string(),
        };
        let value: serde_json::Value = serde_json::from_str(&error.format_json()).unwrap();
        assert_eq!(value["event"], "scan_error");
        assert_eq!(value["scope"], "directory");
    }

    #[test]
    fn test_name() {
        let file_error = ScanEvent::ScanError {
            path: PathBuf::from("/watched/b.txt"),
            scope: ErrorScope::File,
            cause: "denied".to_string(),
        };
        assert_eq!(file_error.name(), Some("b.txt"));
        assert!(file_error.is_error());
        assert!(!file_error.is_directory_error());

        let dir_error = ScanEvent::ScanError {
            path: PathBuf::from("/watched"),
            scope: ErrorScope::Directory,
            cause: "denied".to_string(),
        };
        assert_eq!(dir_error.name(), None);
        assert!(dir_error.is_directory_error());
    }
}
