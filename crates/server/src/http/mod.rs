//! HTTP API over the filesystem core.
//!
//! Every API route is a thin adapter: it parses query parameters, runs the
//! blocking filesystem work on the blocking pool and renders the result or an
//! [`ApiError`] as JSON. Requests that match no route fall through to the
//! embedded frontend.

pub mod error;
pub mod handlers;

use std::any::Any;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::assets;
use crate::config::Settings;
use crate::files::SandboxRoot;

pub use error::{status_for, ApiError};

/// State shared by all handlers. Read-only after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub root: Arc<SandboxRoot>,
    pub preview_max: u64,
    pub search_max_results: usize,
    pub base_path: Arc<str>,
    pub index_html: Arc<str>,
}

impl AppState {
    /// Build the state from validated settings, rendering `index.html` once.
    pub fn new(settings: &Settings) -> Self {
        let index_html = assets::render_index(&assets::load_index(), &settings.base_path);

        Self {
            root: Arc::new(SandboxRoot::new(&settings.root)),
            preview_max: settings.preview_max,
            search_max_results: settings.search_max_results,
            base_path: Arc::from(settings.base_path.as_str()),
            index_html: Arc::from(index_html),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/files",
            get(handlers::list_files).fallback(method_not_allowed),
        )
        .route(
            "/api/preview",
            get(handlers::preview).fallback(method_not_allowed),
        )
        .route(
            "/api/image",
            get(handlers::image).fallback(method_not_allowed),
        )
        .route(
            "/api/download",
            get(handlers::download).fallback(method_not_allowed),
        )
        .route(
            "/api/search",
            get(handlers::search).fallback(method_not_allowed),
        )
        .route("/healthz", get(handlers::health).fallback(method_not_allowed))
        .fallback(assets::handle_static)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    error!(panic = %detail, "Handler panicked");
    ApiError::Internal("internal server error".to_string()).into_response()
}

/// Run blocking filesystem work off the async runtime.
///
/// A panic in `work` surfaces as [`ApiError::Internal`].
pub(crate) async fn run_blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
}
