//! Directory listing.
//!
//! Lists the direct children of a resolved directory. Symlinked children and
//! children whose metadata cannot be read are skipped rather than failing the
//! whole listing.

use std::cmp::Ordering;
use std::fs::{self, Metadata};
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use protocol::messages::{EntryKind, FileEntry};
use tracing::debug;

use super::{types, FileError, ResolvedPath};

/// List the direct children of a directory, directories first.
pub fn list_directory(resolved: &ResolvedPath) -> Result<Vec<FileEntry>, FileError> {
    let shown = resolved.display_path();

    let metadata =
        fs::metadata(resolved.absolute()).map_err(|e| FileError::from_io(e, &shown))?;
    if !metadata.is_dir() {
        return Err(FileError::NotADirectory(shown));
    }

    let entries =
        fs::read_dir(resolved.absolute()).map_err(|e| FileError::from_io(e, &shown))?;

    let mut results = Vec::new();

    for entry_result in entries {
        let entry = match entry_result {
            Ok(e) => e,
            Err(_) => continue,
        };

        // `DirEntry::file_type` does not follow symlinks.
        match entry.file_type() {
            Ok(file_type) if file_type.is_symlink() => continue,
            Ok(_) => {}
            Err(_) => continue,
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                debug!(path = %shown, error = %e, "Skipping entry without metadata");
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        let path = join_relative(resolved.relative(), &name);
        results.push(build_entry(name, &path, &metadata));
    }

    sort_entries(&mut results);

    Ok(results)
}

/// Sort entries directories first, then by case-insensitive name.
///
/// Names that compare equal ignoring case fall back to a case-sensitive
/// comparison so the order is deterministic.
pub fn sort_entries(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    });
}

/// Build an entry from live metadata. `relative` has no leading slash.
pub(crate) fn build_entry(name: String, relative: &str, metadata: &Metadata) -> FileEntry {
    let is_dir = metadata.is_dir();
    let extension = if is_dir {
        String::new()
    } else {
        types::file_extension(&name)
    };

    FileEntry {
        path: format!("/{relative}"),
        kind: if is_dir { EntryKind::Dir } else { EntryKind::File },
        size: if is_dir { 0 } else { metadata.len() },
        modified: format_modified(metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH)),
        extension,
        name,
    }
}

/// Join a root-relative directory and a child path with `/`.
pub(crate) fn join_relative(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}

/// Format a timestamp as RFC 3339 in UTC with second precision.
pub(crate) fn format_modified(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
}
