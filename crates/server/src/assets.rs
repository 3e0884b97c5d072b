//! Embedded frontend and SPA fallback.
//!
//! The frontend build in `web/dist` is compiled into the binary. Requests that
//! match no API route are served from it; unknown paths get `index.html` so
//! the client-side router can take over.

use std::borrow::Cow;
use std::path::Path;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;
use tracing::debug;

use crate::files::clean_request_path;
use crate::files::types::content_type;
use crate::http::AppState;

/// Placeholder in `index.html` replaced by the configured base path.
pub const BASE_PATH_PLACEHOLDER: &str = "__BASE_PATH__/";

const FALLBACK_INDEX: &str = "<!doctype html><html><body>file-browser</body></html>";

#[derive(RustEmbed)]
#[folder = "web/dist"]
struct FrontendAssets;

/// Load the embedded `index.html`, or a minimal page if the bundle has none.
pub fn load_index() -> Cow<'static, [u8]> {
    match FrontendAssets::get("index.html") {
        Some(file) => file.data,
        None => {
            debug!("Frontend bundle has no index.html, using built-in page");
            Cow::Borrowed(FALLBACK_INDEX.as_bytes())
        }
    }
}

/// Substitute the base path into an index template.
///
/// `base_path` is the normalized form (`""` or `/prefix`); the placeholder is
/// replaced by it plus a trailing slash, so an unset base path yields `/`.
pub fn render_index(template: &[u8], base_path: &str) -> String {
    let replacement = format!("{base_path}/");
    String::from_utf8_lossy(template).replace(BASE_PATH_PLACEHOLDER, &replacement)
}

/// Fallback handler for every request no API route matched.
pub async fn handle_static(State(state): State<AppState>, uri: Uri) -> Response {
    let mut request_path = uri.path();
    if !state.base_path.is_empty() {
        if let Some(rest) = request_path.strip_prefix(&*state.base_path) {
            request_path = rest;
        }
    }

    let asset_path = clean_request_path(request_path);
    if asset_path.is_empty() {
        return serve_index(&state);
    }

    match FrontendAssets::get(&asset_path) {
        Some(file) => {
            let mime = content_type(Path::new(&asset_path));
            match HeaderValue::from_str(&mime) {
                Ok(value) => (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, value)],
                    Body::from(file.data.into_owned()),
                )
                    .into_response(),
                Err(_) => serve_index(&state),
            }
        }
        None => serve_index(&state),
    }
}

fn serve_index(state: &AppState) -> Response {
    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        )],
        state.index_html.to_string(),
    )
        .into_response()
}
