//! Filesystem helpers
//!
//! Small utilities shared by the identity and trust loaders. All reads are
//! blocking; resolution happens on whichever thread calls build or reload.

use std::io::Read;
use std::path::Path;
use std::fs;

use super::error::{TlsError, Result};

/// Check that a path exists and points at a regular file
pub fn check_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(TlsError::Config(format!(
            "file does not exist: {}",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(TlsError::Config(format!(
            "path is not a file: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Read a file into memory
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    check_file_exists(path)?;

    fs::read(path).map_err(TlsError::Io)
}

/// Drain a reader into memory
///
/// Used by the stream-based loading strategies; the reader is consumed.
pub fn read_all(reader: &mut dyn Read) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).map_err(TlsError::Io)?;
    Ok(buf)
}
