//! Read-only filesystem operations confined to the served root.
//!
//! This module provides the core of the server:
//! - Request path resolution with traversal and symlink rejection
//! - Directory listing
//! - Ranged preview reads
//! - Flat and bounded recursive name search
//!
//! # Security
//!
//! Every operation takes a [`ResolvedPath`], which can only be produced by
//! [`SandboxRoot::resolve`]. Symlinks are rejected outright rather than
//! resolved and re-checked.

pub mod listing;
pub mod path;
pub mod preview;
pub mod search;
pub mod types;

use std::fs::{self, File, Metadata};
use std::io::{self, ErrorKind};

use thiserror::Error;

pub use listing::{list_directory, sort_entries};
pub use path::{clean_request_path, ResolvedPath, SandboxRoot};
pub use preview::{preview, Preview, PreviewWindow};
pub use search::{search, search_flat, search_recursive, DEFAULT_SEARCH_MAX_RESULTS};

/// Errors produced by the filesystem operations.
///
/// Messages carry the root-relative path only, never the absolute one.
#[derive(Debug, Error)]
pub enum FileError {
    /// Traversal or a symlink component was detected.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The path does not exist.
    #[error("path does not exist: {0}")]
    NotFound(String),

    /// A directory was required.
    #[error("path is not a directory: {0}")]
    NotADirectory(String),

    /// A file was required.
    #[error("path is a directory: {0}")]
    IsADirectory(String),

    /// The requested preview window is malformed.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// The file type is not supported by the operation.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl FileError {
    /// Map an IO error about `display_path`, keeping "not found" distinct.
    pub(crate) fn from_io(err: io::Error, display_path: &str) -> Self {
        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(display_path.to_string()),
            _ => Self::Io(err),
        }
    }
}

/// An open regular file together with the metadata it was opened with.
///
/// The handle is closed when this value is dropped, on every exit path.
#[derive(Debug)]
pub struct OpenFile {
    file: File,
    metadata: Metadata,
    resolved: ResolvedPath,
}

/// Open a resolved path that must be a file.
///
/// Directories are rejected with [`FileError::IsADirectory`].
pub fn open_file(resolved: &ResolvedPath) -> Result<OpenFile, FileError> {
    let shown = resolved.display_path();

    let metadata =
        fs::metadata(resolved.absolute()).map_err(|e| FileError::from_io(e, &shown))?;
    if metadata.is_dir() {
        return Err(FileError::IsADirectory(shown));
    }

    let file = File::open(resolved.absolute()).map_err(|e| FileError::from_io(e, &shown))?;

    Ok(OpenFile {
        file,
        metadata,
        resolved: resolved.clone(),
    })
}

impl OpenFile {
    /// Metadata captured when the file was opened.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// File size in bytes.
    pub fn size(&self) -> u64 {
        self.metadata.len()
    }

    /// File name.
    pub fn name(&self) -> &str {
        self.resolved.name()
    }

    /// Normalized extension of the file name.
    pub fn extension(&self) -> String {
        types::file_extension(self.name())
    }

    /// Fill `buf` from `offset` without moving a shared cursor.
    ///
    /// Returns the number of bytes read, which is short only at end of file.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut filled = 0;

        while filled < buf.len() {
            match positional_read(&self.file, &mut buf[filled..], offset + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(filled)
    }
}

#[cfg(unix)]
fn positional_read(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(windows)]
fn positional_read(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}
