//! Success response bodies for the file-browser HTTP API.
//!
//! Field names follow the JSON the frontend consumes (`type`, `isBinary`,
//! `hasMore`), so some Rust fields are renamed on the wire.

use serde::{Deserialize, Serialize};

/// Type of a listed entry.
///
/// Symbolic links are never listed, so there is no variant for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file (or any non-directory that is not a symlink).
    File,
    /// Directory.
    Dir,
}

/// A single file or directory entry in a listing or search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Root-relative path with a leading slash.
    pub path: String,
    /// Entry type.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Last modified time, RFC 3339 in UTC.
    pub modified: String,
    /// Lowercased, normalized extension. Empty for directories.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extension: String,
}

impl FileEntry {
    /// Whether this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Body of `/api/preview`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    /// Root-relative path with a leading slash.
    pub path: String,
    /// File name.
    pub name: String,
    /// Decoded text of the preview window. Empty when `is_binary` is set.
    pub content: String,
    /// Total file size in bytes.
    pub size: u64,
    /// Last modified time, RFC 3339 in UTC.
    pub modified: String,
    /// Normalized file extension.
    #[serde(rename = "type")]
    pub file_type: String,
    /// Whether the window looks like binary data.
    pub is_binary: bool,
    /// Offset the window actually starts at.
    pub offset: u64,
    /// Effective window length after clamping.
    pub limit: u64,
    /// Whether bytes remain after the window.
    pub has_more: bool,
}

/// Body of `/healthz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
}

impl HealthResponse {
    /// The healthy response.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
