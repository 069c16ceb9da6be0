//! Reading template and fragment sources.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur when reading a source file.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read a UTF-8 file, normalizing CRLF line endings to LF.
pub fn read_normalized(path: &Path) -> Result<String, SourceError> {
    let content = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(normalize_newlines(content))
}

/// Replace CRLF with LF.
pub fn normalize_newlines(content: String) -> String {
    if content.contains("\r\n") {
        content.replace("\r\n", "\n")
    } else {
        content
    }
}

/// Render a path with forward slashes regardless of platform.
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
