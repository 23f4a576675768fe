//! Utility functions for error handling
//!
//! File access helpers that turn filesystem failures into errors naming the
//! offending path.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{FarsError, Result};

/// Check that a source exists before any parsing is attempted
///
/// A missing path is reported as [`FarsError::SourceNotFound`] so callers
/// see the location rather than a generic decode failure.
pub fn ensure_source_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(FarsError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    if !path.is_file() {
        return Err(FarsError::io(
            path,
            io::Error::new(io::ErrorKind::InvalidInput, "path is not a file"),
        ));
    }

    Ok(())
}

/// Safely open a source file with rich error information
///
/// # Arguments
/// * `path` - The path to the file to open
///
/// # Returns
/// * `Result<fs::File>` - The opened file or a detailed error
pub fn open_source(path: &Path) -> Result<fs::File> {
    ensure_source_exists(path)?;

    match fs::File::open(path) {
        Ok(file) => Ok(file),
        // Deleted between the existence check and the open
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(FarsError::SourceNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(FarsError::io(path, e)),
    }
}
