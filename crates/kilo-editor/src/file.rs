//! File collaborators — turning files into lines and bytes back into files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::Result;

/// Read `path` and split it into newline-stripped lines.
///
/// # Errors
///
/// Returns an error if the file cannot be read (including when it does not
/// exist; callers decide whether that is fatal).
pub fn load_lines(path: &Path) -> Result<Vec<Vec<u8>>> {
    let bytes = fs::read(path)?;
    let lines = split_lines(&bytes);
    info!(path = %path.display(), lines = lines.len(), "loaded");
    Ok(lines)
}

/// Split file content into lines without their `\n`, dropping any trailing
/// `\r`s as well. A final newline does not start an extra line.
#[must_use]
pub fn split_lines(bytes: &[u8]) -> Vec<Vec<u8>> {
    if bytes.is_empty() {
        return Vec::new();
    }
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|&b| b == b'\n')
        .map(|line| {
            let end = line.iter().rposition(|&b| b != b'\r').map_or(0, |i| i + 1);
            line[..end].to_vec()
        })
        .collect()
}

/// Write `bytes` to `path`, creating or truncating it.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn persist(path: &Path, bytes: &[u8]) -> Result<usize> {
    fs::write(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "saved");
    Ok(bytes.len())
}
