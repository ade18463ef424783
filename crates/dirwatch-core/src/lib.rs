//! dirwatch-core - Incremental directory scanning
//!
//! This crate provides the polling-based scan engine:
//! - Listing a directory for files with a given suffix
//! - Tracking per-file scan progress across ticks
//! - Reporting appeared/removed files and new magic text matches
//! - Configuration management

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod fs;
pub mod registry;

pub use config::{Config, EventFormat, WatchConfig};
pub use engine::ScanEngine;
pub use error::{DirwatchError, Result};
pub use event::{ErrorScope, ScanEvent};
pub use registry::{FileRegistry, WatchedFile};
