//! Error body and machine-readable error codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-readable error code carried in every non-2xx JSON body.
///
/// The code names the stage of the request that failed. The HTTP status is
/// derived separately from the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request path could not be resolved inside the root.
    InvalidPath,
    /// Reading a directory failed.
    ReadDirFailed,
    /// Querying file metadata failed.
    StatFailed,
    /// A file was required but the path is a directory.
    NotAFile,
    /// The preview offset or limit is malformed.
    InvalidRange,
    /// Reading file content failed.
    ReadFailed,
    /// The file is not a supported image type.
    UnsupportedImage,
    /// The HTTP method is not accepted by the route.
    MethodNotAllowed,
    /// An unexpected fault occurred while handling the request.
    InternalError,
}

impl ErrorCode {
    /// The wire representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidPath => "INVALID_PATH",
            Self::ReadDirFailed => "READ_DIR_FAILED",
            Self::StatFailed => "STAT_FAILED",
            Self::NotAFile => "NOT_A_FILE",
            Self::InvalidRange => "INVALID_RANGE",
            Self::ReadFailed => "READ_FAILED",
            Self::UnsupportedImage => "UNSUPPORTED_IMAGE",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body of every error response: `{"error": ..., "code": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable code.
    pub code: ErrorCode,
}

impl ErrorBody {
    /// Create an error body from a code and a message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code,
        }
    }
}
