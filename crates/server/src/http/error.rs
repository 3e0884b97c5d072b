//! API error type and its JSON rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use protocol::{ErrorBody, ErrorCode};
use thiserror::Error;
use tracing::{debug, error};

use crate::files::FileError;

/// Errors returned by the API handlers.
///
/// A filesystem failure carries the [`ErrorCode`] of the stage that failed;
/// the HTTP status always follows from the [`FileError`] kind.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{source}")]
    File { code: ErrorCode, source: FileError },

    #[error("{0}")]
    InvalidQuery(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Wrap a filesystem error with the code of the failing stage.
    pub fn file(code: ErrorCode, source: FileError) -> Self {
        Self::File { code, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::File { source, .. } => status_for(source),
            Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::File { code, .. } => *code,
            Self::InvalidQuery(_) => ErrorCode::InvalidPath,
            Self::MethodNotAllowed => ErrorCode::MethodNotAllowed,
            Self::Internal(_) => ErrorCode::InternalError,
        }
    }
}

/// HTTP status for a filesystem error kind.
pub fn status_for(err: &FileError) -> StatusCode {
    match err {
        FileError::AccessDenied(_) => StatusCode::FORBIDDEN,
        FileError::NotFound(_) => StatusCode::NOT_FOUND,
        FileError::NotADirectory(_) | FileError::IsADirectory(_) | FileError::InvalidRange(_) => {
            StatusCode::BAD_REQUEST
        }
        FileError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        FileError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(%code, %status, error = %message, "Request failed");
        } else {
            debug!(%code, %status, error = %message, "Request rejected");
        }

        (status, Json(ErrorBody::new(code, message))).into_response()
    }
}
