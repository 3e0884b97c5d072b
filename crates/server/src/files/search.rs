//! Case-insensitive name search.
//!
//! A flat search matches the direct children of one directory. A recursive
//! search walks the subtree and stops the whole walk once the result cap is
//! reached, since an unranked search over an unbounded tree has no natural end.

use std::fs;

use protocol::messages::FileEntry;
use tracing::debug;
use walkdir::WalkDir;

use super::listing::{build_entry, join_relative, sort_entries};
use super::ResolvedPath;

/// Default cap on recursive search results.
pub const DEFAULT_SEARCH_MAX_RESULTS: usize = 100;

/// Search below `resolved` for names containing `query`, sorted for display.
///
/// The query is trimmed and compared case-insensitively. An empty query
/// returns no results without touching the filesystem.
pub fn search(
    resolved: &ResolvedPath,
    query: &str,
    recursive: bool,
    max_results: usize,
) -> Vec<FileEntry> {
    let query_lower = query.trim().to_lowercase();
    if query_lower.is_empty() {
        return Vec::new();
    }

    let mut results = if recursive {
        search_recursive(resolved, &query_lower, max_results)
    } else {
        search_flat(resolved, &query_lower)
    };

    sort_entries(&mut results);
    results
}

/// Match the direct children of one directory. Output is unsorted.
///
/// Symlinks and entries without readable metadata are skipped. A path that
/// cannot be read as a directory yields no results.
pub fn search_flat(resolved: &ResolvedPath, query_lower: &str) -> Vec<FileEntry> {
    if query_lower.is_empty() {
        return Vec::new();
    }

    let entries = match fs::read_dir(resolved.absolute()) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(path = %resolved.display_path(), error = %e, "Flat search could not read directory");
            return Vec::new();
        }
    };

    let mut results = Vec::new();

    for entry in entries.flatten() {
        match entry.file_type() {
            Ok(file_type) if file_type.is_symlink() => continue,
            Ok(_) => {}
            Err(_) => continue,
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.to_lowercase().contains(query_lower) {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        let path = join_relative(resolved.relative(), &name);
        results.push(build_entry(name, &path, &metadata));
    }

    results
}

/// Walk the subtree below `resolved` and collect at most `max_results`
/// matches. Output is unsorted.
///
/// The starting directory itself is not a candidate. Symlinks are neither
/// reported nor descended into, and errors on individual subpaths are skipped.
pub fn search_recursive(
    resolved: &ResolvedPath,
    query_lower: &str,
    max_results: usize,
) -> Vec<FileEntry> {
    let mut results = Vec::new();
    if query_lower.is_empty() || max_results == 0 {
        return results;
    }

    let walker = WalkDir::new(resolved.absolute())
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name();

    for item in walker {
        let entry = match item {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable path during search");
                continue;
            }
        };

        // With `follow_links(false)` symlinks are yielded but never entered.
        if entry.file_type().is_symlink() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.to_lowercase().contains(query_lower) {
            continue;
        }

        let Ok(metadata) = entry.metadata() else {
            continue;
        };

        let Ok(child) = entry.path().strip_prefix(resolved.absolute()) else {
            continue;
        };
        let child: Vec<String> = child
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        let path = join_relative(resolved.relative(), &child.join("/"));
        results.push(build_entry(name, &path, &metadata));

        if results.len() >= max_results {
            debug!(
                path = %resolved.display_path(),
                max_results,
                "Recursive search reached result cap"
            );
            break;
        }
    }

    results
}
