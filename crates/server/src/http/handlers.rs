//! Route handlers.

use std::path::PathBuf;

use axum::body::Body;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, Request, State};
use axum::http::{header, HeaderValue};
use axum::response::Response;
use axum::Json;
use protocol::{ErrorCode, FileEntry, HealthResponse, PreviewResponse};
use serde::Deserialize;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use super::{run_blocking, ApiError, AppState};
use crate::files::listing::format_modified;
use crate::files::{self, open_file, types, FileError, PreviewWindow, ResolvedPath, SandboxRoot};

/// Query for endpoints that take only a path.
#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub path: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub path: Option<String>,
    pub q: Option<String>,
    pub recursive: Option<String>,
}

fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(inner)| inner)
        .map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))
}

fn resolve(root: &SandboxRoot, path: Option<&str>) -> Result<ResolvedPath, ApiError> {
    root.resolve(path.unwrap_or_default())
        .map_err(|e| ApiError::file(ErrorCode::InvalidPath, e))
}

/// Code for a failure while opening a file for reading.
fn open_error(err: FileError) -> ApiError {
    let code = match err {
        FileError::IsADirectory(_) => ErrorCode::NotAFile,
        FileError::NotFound(_) => ErrorCode::StatFailed,
        _ => ErrorCode::ReadFailed,
    };
    ApiError::file(code, err)
}

/// `GET /api/files?path=`
pub async fn list_files(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
) -> Result<Json<Vec<FileEntry>>, ApiError> {
    let query = parse_query(query)?;
    let root = state.root.clone();

    let entries = run_blocking(move || {
        let resolved = resolve(&root, query.path.as_deref())?;
        files::list_directory(&resolved).map_err(|e| ApiError::file(ErrorCode::ReadDirFailed, e))
    })
    .await?;

    Ok(Json(entries))
}

/// `GET /api/preview?path=&offset=&limit=`
pub async fn preview(
    State(state): State<AppState>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> Result<Json<PreviewResponse>, ApiError> {
    let query = parse_query(query)?;
    let root = state.root.clone();
    let preview_max = state.preview_max;

    let response = run_blocking(move || {
        let resolved = resolve(&root, query.path.as_deref())?;
        let file = open_file(&resolved).map_err(open_error)?;

        let window = PreviewWindow::parse(query.offset.as_deref(), query.limit.as_deref())
            .map_err(|e| ApiError::file(ErrorCode::InvalidRange, e))?;

        let preview = files::preview::read_preview(&file, window, preview_max)
            .map_err(|e| ApiError::file(ErrorCode::ReadFailed, e))?;

        let is_binary = types::looks_binary(&preview.extension, &preview.content, preview.offset);
        let content = if is_binary {
            String::new()
        } else {
            String::from_utf8_lossy(&preview.content).into_owned()
        };

        Ok(PreviewResponse {
            path: resolved.display_path(),
            name: preview.name,
            content,
            size: preview.size,
            modified: format_modified(preview.modified),
            file_type: preview.extension,
            is_binary,
            offset: preview.offset,
            limit: preview.limit,
            has_more: preview.has_more,
        })
    })
    .await?;

    Ok(Json(response))
}

/// `GET /api/image?path=`
pub async fn image(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
    request: Request,
) -> Result<Response, ApiError> {
    let query = parse_query(query)?;
    let root = state.root.clone();

    let path = run_blocking(move || {
        let resolved = resolve(&root, query.path.as_deref())?;
        let file = open_file(&resolved).map_err(open_error)?;

        if !types::is_image_extension(&file.extension()) {
            return Err(ApiError::file(
                ErrorCode::UnsupportedImage,
                FileError::UnsupportedType(resolved.display_path()),
            ));
        }

        Ok(resolved.absolute().to_path_buf())
    })
    .await?;

    serve_file(path, request).await
}

/// `GET /api/download?path=`
pub async fn download(
    State(state): State<AppState>,
    query: Result<Query<PathQuery>, QueryRejection>,
    request: Request,
) -> Result<Response, ApiError> {
    let query = parse_query(query)?;
    let root = state.root.clone();

    let (path, name) = run_blocking(move || {
        let resolved = resolve(&root, query.path.as_deref())?;
        let file = open_file(&resolved).map_err(open_error)?;
        Ok((resolved.absolute().to_path_buf(), file.name().to_string()))
    })
    .await?;

    let mut response = serve_file(path, request).await?;
    if response.status().is_success() {
        if let Ok(value) = HeaderValue::from_bytes(content_disposition(&name).as_bytes()) {
            response
                .headers_mut()
                .insert(header::CONTENT_DISPOSITION, value);
        }
    }

    Ok(response)
}

/// `GET /api/search?path=&q=&recursive=`
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<FileEntry>>, ApiError> {
    let query = parse_query(query)?;

    let q = query.q.unwrap_or_default();
    if q.trim().is_empty() {
        return Ok(Json(Vec::new()));
    }
    let recursive = query.recursive.as_deref() == Some("true");

    let root = state.root.clone();
    let max_results = state.search_max_results;
    let path = query.path;

    let results = run_blocking(move || {
        let resolved = resolve(&root, path.as_deref())?;
        Ok(files::search(&resolved, &q, recursive, max_results))
    })
    .await?;

    Ok(Json(results))
}

/// `GET /healthz`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Serve a validated file with range and conditional request support.
///
/// `ServeFile` reopens `path`, so a component swapped for a symlink after
/// validation is followed. The window is one blocking task long.
async fn serve_file(path: PathBuf, request: Request) -> Result<Response, ApiError> {
    let response = ServeFile::new(path)
        .oneshot(request)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(response.map(Body::new))
}

/// `Content-Disposition` value for a download of `name`.
///
/// Quotes, backslashes and control characters are replaced with `_`.
fn content_disposition(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    format!("attachment; filename=\"{safe}\"")
}
