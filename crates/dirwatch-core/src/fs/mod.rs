mod lines;
mod listing;

pub use lines::{scan_lines, LineScan};
pub use listing::DirectoryLister;
