//! Request path resolution confined to the served root.
//!
//! Every API operation turns its untrusted `path` parameter into a
//! [`ResolvedPath`] here before touching the filesystem. A resolved path is
//! lexically inside the root and no component between the root and the target
//! is a symbolic link.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::FileError;

/// The directory the server is confined to.
///
/// The root is fixed at startup and never changes. It is expected to be an
/// absolute, existing directory that is not itself a symlink; configuration
/// validation guarantees that before a `SandboxRoot` is built.
#[derive(Debug, Clone)]
pub struct SandboxRoot {
    root: PathBuf,
}

/// A request path that passed resolution.
///
/// This is the only form the listing, preview and search operations accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Absolute filesystem path.
    absolute: PathBuf,
    /// Root-relative path with `/` separators and no leading slash.
    /// Empty for the root itself.
    relative: String,
}

impl ResolvedPath {
    /// Absolute filesystem path.
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Root-relative path without a leading slash (`""` for the root).
    pub fn relative(&self) -> &str {
        &self.relative
    }

    /// Root-relative path with a leading slash, as shown to clients.
    pub fn display_path(&self) -> String {
        format!("/{}", self.relative)
    }

    /// Last path component, or an empty string for the root.
    pub fn name(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or_default()
    }
}

impl SandboxRoot {
    /// Create a sandbox over an already validated root directory.
    ///
    /// The path is normalized lexically so that later containment checks
    /// compare like with like.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: normalize(&root.into()),
        }
    }

    /// The root directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resolve an untrusted request path against the root.
    ///
    /// Empty input, `"."`, `"/"` and whitespace all resolve to the root.
    /// Fails with [`FileError::AccessDenied`] when the path escapes the root or
    /// crosses a symlink, and with [`FileError::NotFound`] when a component
    /// does not exist. Resolution only reads filesystem metadata.
    pub fn resolve(&self, request_path: &str) -> Result<ResolvedPath, FileError> {
        let candidate = clean_request_path(request_path);
        let shown = format!("/{candidate}");

        if candidate.contains('\0') {
            return Err(FileError::NotFound(shown));
        }

        // Native join may reinterpret separators inside a segment (`\` on
        // Windows), so normalize again and recompute the relative path.
        let joined = normalize(&self.root.join(&candidate));
        let relative = match joined.strip_prefix(&self.root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => {
                debug!(path = %shown, "Rejected path escaping root");
                return Err(FileError::AccessDenied(shown));
            }
        };

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        self.ensure_no_symlink(&parts, &shown)?;

        Ok(ResolvedPath {
            absolute: joined,
            relative: parts.join("/"),
        })
    }

    /// Walk from the root down to the target without following links.
    fn ensure_no_symlink(&self, parts: &[String], shown: &str) -> Result<(), FileError> {
        let mut current = self.root.clone();

        for (index, part) in parts.iter().enumerate() {
            current.push(part);

            let metadata = fs::symlink_metadata(&current).map_err(|e| match e.kind() {
                ErrorKind::NotFound => FileError::NotFound(shown.to_string()),
                _ => FileError::Io(e),
            })?;

            if metadata.file_type().is_symlink() {
                debug!(path = %shown, component = %part, "Rejected symlink in path");
                return Err(FileError::AccessDenied(shown.to_string()));
            }

            // A file in the middle of the path means the target cannot exist.
            if !metadata.is_dir() && index + 1 < parts.len() {
                return Err(FileError::NotFound(shown.to_string()));
            }
        }

        Ok(())
    }
}

/// Lexically clean a request path as a POSIX-style virtual path.
///
/// Trims whitespace, collapses repeated slashes and resolves `.` and `..`
/// without ever climbing above `/`. Returns the result without its leading
/// slash, so the root is `""`.
pub fn clean_request_path(request_path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in request_path.trim().split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Lexically normalize a native path: drop `.` and apply `..`.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never climb above the root of an absolute path.
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }

    out
}
