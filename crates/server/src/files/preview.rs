//! Ranged preview reads.
//!
//! A preview returns one window of a file's bytes. The requested window is
//! clamped against the file size and the server-wide preview maximum, and is
//! read with positional reads so concurrent previews of the same file do not
//! interfere.

use std::time::SystemTime;

use super::{open_file, FileError, OpenFile, ResolvedPath};

/// Requested preview window. Both values are already known to be `>= 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreviewWindow {
    /// Byte offset to start at.
    pub offset: u64,
    /// Number of bytes wanted; `0` means "rest of the file".
    pub limit: u64,
}

impl PreviewWindow {
    /// Parse the `offset` and `limit` query parameters.
    ///
    /// Absent or empty values are `0`. Non-integer or negative values fail
    /// with [`FileError::InvalidRange`].
    pub fn parse(offset: Option<&str>, limit: Option<&str>) -> Result<Self, FileError> {
        Ok(Self {
            offset: parse_non_negative("offset", offset)?,
            limit: parse_non_negative("limit", limit)?,
        })
    }

    /// Clamp the window against a file of `file_size` bytes.
    ///
    /// Returns `(offset, limit)` where `offset <= file_size` and
    /// `offset + limit <= file_size`. A `max_preview` of `0` means unlimited.
    pub fn clamp(&self, file_size: u64, max_preview: u64) -> (u64, u64) {
        let offset = self.offset.min(file_size);
        let remaining = file_size - offset;

        let mut limit = if self.limit == 0 { remaining } else { self.limit };
        if max_preview > 0 {
            limit = limit.min(max_preview);
        }

        (offset, limit.min(remaining))
    }
}

fn parse_non_negative(field: &str, value: Option<&str>) -> Result<u64, FileError> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(0),
        Some(v) => v,
    };

    let parsed: i64 = value
        .parse()
        .map_err(|_| FileError::InvalidRange(format!("invalid {field}")))?;
    if parsed < 0 {
        return Err(FileError::InvalidRange(
            "offset/limit must be >= 0".to_string(),
        ));
    }

    Ok(parsed as u64)
}

/// One window of file content plus the file facts a client needs.
#[derive(Debug, Clone)]
pub struct Preview {
    /// File name.
    pub name: String,
    /// Normalized extension, reported alongside the raw bytes.
    pub extension: String,
    /// Total file size.
    pub size: u64,
    /// Last modification time.
    pub modified: SystemTime,
    /// Raw bytes of the window.
    pub content: Vec<u8>,
    /// Offset the window actually starts at.
    pub offset: u64,
    /// Effective window length after clamping.
    pub limit: u64,
    /// Whether bytes remain after the window.
    pub has_more: bool,
}

/// Read a preview window from a resolved file.
///
/// Directories are rejected with [`FileError::IsADirectory`].
pub fn preview(
    resolved: &ResolvedPath,
    window: PreviewWindow,
    max_preview: u64,
) -> Result<Preview, FileError> {
    let file = open_file(resolved)?;
    read_preview(&file, window, max_preview)
}

/// Read a preview window from an already opened file.
pub fn read_preview(
    file: &OpenFile,
    window: PreviewWindow,
    max_preview: u64,
) -> Result<Preview, FileError> {
    let size = file.size();
    let (offset, limit) = window.clamp(size, max_preview);

    let mut content = vec![0u8; limit as usize];
    let read = file.read_at(&mut content, offset)?;
    content.truncate(read);

    Ok(Preview {
        name: file.name().to_string(),
        extension: file.extension(),
        size,
        modified: file.metadata().modified().unwrap_or(SystemTime::UNIX_EPOCH),
        content,
        offset,
        limit,
        has_more: offset + (read as u64) < size,
    })
}
