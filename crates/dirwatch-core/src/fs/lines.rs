use std::fs::File;
use std::io::{BufRead, BufReader, Seek};
use std::path::Path;

use crate::error::{DirwatchError, Result};

/// Outcome of reading a file past its already-scanned lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineScan {
    /// Number of lines in the file, counting a final line without newline
    pub total_lines: usize,
    /// 1-based numbers of searched lines containing the needle
    pub matches: Vec<usize>,
    /// The file had fewer lines than `start` and was searched from the top
    pub truncated: bool,
}

/// Read `path` and search every line after `start` for `needle`.
///
/// Lines up to `start` are counted but never decoded or searched. If the
/// file turns out to be shorter than `start` it is searched again from the
/// first line. Invalid UTF-8 is replaced rather than rejected. The file
/// handle is dropped before returning, on success and on error.
pub fn scan_lines(path: &Path, needle: &str, start: usize) -> Result<LineScan> {
    let access_error = |source: std::io::Error| DirwatchError::FileAccess {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(access_error)?;
    let mut reader = BufReader::new(file);

    let mut scan = search_after(&mut reader, needle, start).map_err(access_error)?;
    if scan.total_lines < start {
        reader.rewind().map_err(access_error)?;
        scan = search_after(&mut reader, needle, 0).map_err(access_error)?;
        scan.truncated = true;
    }

    Ok(scan)
}

fn search_after<R: BufRead>(
    reader: &mut R,
    needle: &str,
    start: usize,
) -> std::io::Result<LineScan> {
    let mut scan = LineScan::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        scan.total_lines += 1;
        if scan.total_lines <= start {
            continue;
        }

        let line = String::from_utf8_lossy(trim_newline(&buf));
        if line.contains(needle) {
            scan.matches.push(scan.total_lines);
        }
    }

    Ok(scan)
}

fn trim_newline(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
