use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirwatchError {
    #[error("Cannot read directory {path}: {source}")]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read file {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File is not being watched: {0}")]
    NotWatched(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DirwatchError>;
