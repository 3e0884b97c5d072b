//! Configuration management for the file-browser server.
//!
//! Values are layered from lowest to highest precedence: compiled-in
//! defaults, an optional TOML file, `FILE_BROWSER_*` environment variables and
//! command-line flags. [`Config::validate`] turns the raw values into
//! [`Settings`], the checked form the server runs with.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::files::path::normalize;
use crate::files::DEFAULT_SEARCH_MAX_RESULTS;

/// Default listen address.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default preview limit in bytes (1 MiB), also used when `0` is configured.
pub const DEFAULT_PREVIEW_MAX: u64 = 1024 * 1024;

/// Valid log level values for tracing configuration.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("root path is required")]
    EmptyRoot,

    #[error("root not accessible: {path}: {reason}")]
    RootNotAccessible { path: PathBuf, reason: String },

    #[error("root path cannot be a symlink: {0}")]
    RootIsSymlink(PathBuf),

    #[error("root path must be a directory: {0}")]
    RootNotDirectory(PathBuf),

    #[error("invalid preview_max {value:?}: {reason}")]
    InvalidPreviewMax { value: String, reason: String },

    #[error("search_max_results must be at least 1, got {0}")]
    InvalidSearchMaxResults(usize),

    #[error("log_level must be one of: trace, debug, info, warn, error; got {0}")]
    InvalidLogLevel(String),
}

/// Raw configuration as read from file, environment and flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory to serve.
    pub root: PathBuf,

    /// Address to bind.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Maximum preview size, e.g. `1MB` or `512KB`.
    pub preview_max: String,

    /// Prefix the frontend is mounted under behind a reverse proxy.
    pub base_path: String,

    /// Cap on recursive search results.
    pub search_max_results: usize,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            preview_max: "1MB".to_string(),
            base_path: String::new(),
            search_max_results: DEFAULT_SEARCH_MAX_RESULTS,
            log_level: "info".to_string(),
        }
    }
}

/// Command-line and environment overrides.
///
/// Every field is optional so that only values the user actually set replace
/// those from the config file.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    /// Root directory to serve
    #[arg(long = "path", env = "FILE_BROWSER_PATH", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "FILE_BROWSER_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "FILE_BROWSER_PORT")]
    pub port: Option<u16>,

    /// Maximum preview size (e.g. 1MB, 512KB)
    #[arg(long, env = "FILE_BROWSER_PREVIEW_MAX", value_name = "SIZE")]
    pub preview_max: Option<String>,

    /// Base path for reverse proxy deployment (e.g. /files)
    #[arg(long, env = "FILE_BROWSER_BASE_PATH")]
    pub base_path: Option<String>,

    /// Maximum number of recursive search results
    #[arg(long, env = "FILE_BROWSER_SEARCH_MAX_RESULTS", value_name = "N")]
    pub search_max_results: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "FILE_BROWSER_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Validated configuration the server runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Absolute, normalized root directory.
    pub root: PathBuf,
    /// Address to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Maximum preview size in bytes. Always positive.
    pub preview_max: u64,
    /// Normalized base path: empty, or `/prefix` without a trailing slash.
    pub base_path: String,
    /// Cap on recursive search results.
    pub search_max_results: usize,
    /// Lowercased log level.
    pub log_level: String,
}

impl Settings {
    /// Listen address as `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "root={} host={} port={} preview-max={} base-path={} search-max-results={} log-level={}",
            self.root.display(),
            self.host,
            self.port,
            self.preview_max,
            self.base_path,
            self.search_max_results,
            self.log_level,
        )
    }
}

impl Config {
    /// Replace values with those set on the command line or in the environment.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(root) = overrides.root {
            self.root = root;
        }
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(preview_max) = overrides.preview_max {
            self.preview_max = preview_max;
        }
        if let Some(base_path) = overrides.base_path {
            self.base_path = base_path;
        }
        if let Some(search_max_results) = overrides.search_max_results {
            self.search_max_results = search_max_results;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
    }

    /// Validate the configuration and produce [`Settings`].
    ///
    /// The root is made absolute against the current directory and must be an
    /// existing directory that is not itself a symlink.
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let preview_max = match parse_size(&self.preview_max)? {
            0 => DEFAULT_PREVIEW_MAX,
            bytes => bytes,
        };

        if self.search_max_results < 1 {
            return Err(ConfigError::InvalidSearchMaxResults(self.search_max_results));
        }

        let log_level = self.log_level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        let root = validate_root(&self.root)?;

        Ok(Settings {
            root,
            host: self.host.clone(),
            port: self.port,
            preview_max,
            base_path: normalize_base_path(&self.base_path),
            search_max_results: self.search_max_results,
            log_level,
        })
    }

    /// Load configuration from a file.
    ///
    /// If the file does not exist, returns the default configuration.
    /// If the file exists but is invalid TOML, returns an error with
    /// a helpful message.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| anyhow::anyhow!("Invalid TOML configuration: {}", format_toml_error(&e)))
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }
}

/// Returns the conventional config file path, `~/.config/file-browser/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("file-browser")
        .join("config.toml")
}

fn validate_root(root: &Path) -> Result<PathBuf, ConfigError> {
    if root.as_os_str().is_empty() {
        return Err(ConfigError::EmptyRoot);
    }

    let absolute = if root.is_absolute() {
        root.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|e| ConfigError::RootNotAccessible {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?;
        cwd.join(root)
    };
    let absolute = normalize(&absolute);

    let metadata =
        fs::symlink_metadata(&absolute).map_err(|e| ConfigError::RootNotAccessible {
            path: absolute.clone(),
            reason: e.to_string(),
        })?;
    if metadata.file_type().is_symlink() {
        return Err(ConfigError::RootIsSymlink(absolute));
    }
    if !metadata.is_dir() {
        return Err(ConfigError::RootNotDirectory(absolute));
    }

    Ok(absolute)
}

/// Parse a size string such as `1024`, `512K`, `1.5MB` or `1G`.
///
/// Suffixes are case-insensitive binary multiples. `0` is accepted and left
/// for the caller to interpret.
pub fn parse_size(input: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidPreviewMax {
        value: input.to_string(),
        reason: reason.to_string(),
    };

    let value = input.trim().to_uppercase();
    if value.is_empty() {
        return Err(invalid("empty size"));
    }

    const SUFFIXES: &[(&str, u64)] = &[
        ("KB", 1024),
        ("K", 1024),
        ("MB", 1024 * 1024),
        ("M", 1024 * 1024),
        ("GB", 1024 * 1024 * 1024),
        ("G", 1024 * 1024 * 1024),
    ];

    let (number, multiplier) = SUFFIXES
        .iter()
        .find_map(|(suffix, multiplier)| {
            value
                .strip_suffix(suffix)
                .map(|rest| (rest.trim(), *multiplier))
        })
        .unwrap_or((value.as_str(), 1));

    if number.is_empty() {
        return Err(invalid("missing number"));
    }

    let parsed: f64 = number.parse().map_err(|_| invalid("not a number"))?;
    if !parsed.is_finite() {
        return Err(invalid("not a finite number"));
    }
    if parsed < 0.0 {
        return Err(invalid("size must be >= 0"));
    }

    Ok((parsed * multiplier as f64) as u64)
}

/// Normalize a base path to `""` or `/prefix` without a trailing slash.
pub fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim();
    if trimmed.is_empty() || trimmed == "/" {
        return String::new();
    }

    let with_leading = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };

    with_leading.trim_end_matches('/').to_string()
}

/// Format a TOML deserialization error for user-friendly display.
fn format_toml_error(error: &toml::de::Error) -> String {
    let mut msg = error.message().to_string();

    if let Some(span) = error.span() {
        msg.push_str(&format!(" (at position {}..{})", span.start, span.end));
    }

    msg
}
