//! HTTP API integration tests.
//!
//! These tests drive the full router in process:
//! - Listing, preview and search responses
//! - Error statuses and codes
//! - Image and download serving
//! - Frontend fallback

use std::fs;
use std::path::Path;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use file_browser::protocol::{EntryKind, ErrorBody, ErrorCode, FileEntry, PreviewResponse};
use file_browser::{router, AppState, Config};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn error_code(&self) -> ErrorCode {
        self.json::<ErrorBody>().code
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Create the standard fixture: `test.txt` ("hello world") and `subdir/nested.txt`.
fn create_test_structure(dir: &Path) {
    fs::create_dir_all(dir.join("subdir")).unwrap();
    fs::write(dir.join("test.txt"), "hello world").unwrap();
    fs::write(dir.join("subdir/nested.txt"), "Nested").unwrap();
}

fn create_app_with(configure: impl FnOnce(&mut Config)) -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    create_test_structure(temp_dir.path());

    let mut config = Config {
        root: temp_dir.path().to_path_buf(),
        ..Config::default()
    };
    configure(&mut config);

    let settings = config.validate().unwrap();
    (router(AppState::new(&settings)), temp_dir)
}

fn create_app() -> (Router, TempDir) {
    create_app_with(|_| {})
}

async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    TestResponse {
        status,
        headers,
        body,
    }
}

async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

// =============================================================================
// Basic scenario
// =============================================================================

#[tokio::test]
async fn test_preview_window_and_basic_errors() {
    let (app, _temp_dir) = create_app();

    let response = get(&app, "/api/preview?path=/test.txt&offset=0&limit=5").await;
    assert_eq!(response.status, StatusCode::OK);
    let preview: PreviewResponse = response.json();
    assert_eq!(preview.content, "hello");
    assert!(preview.has_more);
    assert_eq!(preview.path, "/test.txt");
    assert_eq!(preview.name, "test.txt");
    assert_eq!(preview.size, 11);
    assert_eq!(preview.file_type, "txt");
    assert!(!preview.is_binary);

    let response = get(&app, "/api/files?path=/nonexistent").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.error_code(), ErrorCode::InvalidPath);

    let response = get(&app, "/api/preview?path=/subdir").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), ErrorCode::NotAFile);

    let response = get(&app, "/api/search?path=/&q=&recursive=true").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json::<Vec<FileEntry>>().is_empty());
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_root() {
    let (app, _temp_dir) = create_app();

    for uri in ["/api/files", "/api/files?path=", "/api/files?path=/"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status, StatusCode::OK, "{uri}");

        let entries: Vec<FileEntry> = response.json();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "subdir");
        assert_eq!(entries[0].kind, EntryKind::Dir);
        assert_eq!(entries[1].path, "/test.txt");
        assert_eq!(entries[1].size, 11);
    }
}

#[tokio::test]
async fn test_list_traversal_stays_inside_root() {
    let (app, _temp_dir) = create_app();

    // `..` above the root is clamped, so this names `<root>/subdir`.
    let response = get(&app, "/api/files?path=/../../subdir").await;
    assert_eq!(response.status, StatusCode::OK);
    let entries: Vec<FileEntry> = response.json();
    assert_eq!(entries[0].path, "/subdir/nested.txt");

    let response = get(&app, "/api/files?path=/../../../etc").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_file_is_bad_request() {
    let (app, _temp_dir) = create_app();

    let response = get(&app, "/api/files?path=/test.txt").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), ErrorCode::ReadDirFailed);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_is_forbidden() {
    let (app, temp_dir) = create_app();
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("secret.txt"), "secret").unwrap();
    std::os::unix::fs::symlink(outside.path(), temp_dir.path().join("escape")).unwrap();

    for uri in [
        "/api/files?path=/escape",
        "/api/preview?path=/escape/secret.txt",
        "/api/download?path=/escape/secret.txt",
        "/api/search?path=/escape&q=secret",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(response.error_code(), ErrorCode::InvalidPath, "{uri}");
    }

    // The listing of the parent silently skips the link.
    let entries: Vec<FileEntry> = get(&app, "/api/files?path=/").await.json();
    assert!(entries.iter().all(|e| e.name != "escape"));
}

// =============================================================================
// Preview
// =============================================================================

#[tokio::test]
async fn test_preview_invalid_range() {
    let (app, _temp_dir) = create_app();

    for uri in [
        "/api/preview?path=/test.txt&offset=-1",
        "/api/preview?path=/test.txt&limit=-5",
        "/api/preview?path=/test.txt&offset=abc",
    ] {
        let response = get(&app, uri).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(response.error_code(), ErrorCode::InvalidRange, "{uri}");
    }
}

#[tokio::test]
async fn test_preview_offset_past_end() {
    let (app, _temp_dir) = create_app();

    let preview: PreviewResponse = get(&app, "/api/preview?path=/test.txt&offset=100")
        .await
        .json();
    assert_eq!(preview.offset, 11);
    assert_eq!(preview.limit, 0);
    assert_eq!(preview.content, "");
    assert!(!preview.has_more);
}

#[tokio::test]
async fn test_preview_limit_clamped_to_maximum() {
    let (app, _temp_dir) = create_app_with(|config| config.preview_max = "4".to_string());

    let preview: PreviewResponse = get(&app, "/api/preview?path=/test.txt&limit=100")
        .await
        .json();
    assert_eq!(preview.content, "hell");
    assert_eq!(preview.limit, 4);
    assert!(preview.has_more);
}

#[tokio::test]
async fn test_preview_binary_content_is_withheld() {
    let (app, temp_dir) = create_app();
    fs::write(temp_dir.path().join("blob.bin"), [0u8, 1, 2, 0xff]).unwrap();

    let preview: PreviewResponse = get(&app, "/api/preview?path=/blob.bin").await.json();
    assert!(preview.is_binary);
    assert_eq!(preview.content, "");
    assert_eq!(preview.file_type, "bin");
    assert_eq!(preview.size, 4);
}

#[tokio::test]
async fn test_preview_paging_splits_multibyte_characters() {
    let (app, temp_dir) = create_app();
    // Six two-byte characters; three-byte windows cut every other one.
    fs::write(temp_dir.path().join("notes.log"), "éééééé").unwrap();

    let mut offset = 0;
    loop {
        let uri = format!("/api/preview?path=/notes.log&offset={offset}&limit=3");
        let preview: PreviewResponse = get(&app, &uri).await.json();

        assert!(!preview.is_binary, "window at {offset}");
        assert!(preview.content.contains('é'), "window at {offset}");
        assert_eq!(preview.file_type, "log");

        offset += preview.limit;
        if !preview.has_more {
            break;
        }
    }
    assert_eq!(offset, 12);
}

#[tokio::test]
async fn test_preview_missing_file() {
    let (app, _temp_dir) = create_app();

    let response = get(&app, "/api/preview?path=/missing.txt").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Image and download
// =============================================================================

#[tokio::test]
async fn test_image_served_with_content_type() {
    let (app, temp_dir) = create_app();
    fs::write(temp_dir.path().join("pixel.png"), b"\x89PNG fake").unwrap();

    let response = get(&app, "/api/image?path=/pixel.png").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(&response.body[..], b"\x89PNG fake");
}

#[tokio::test]
async fn test_image_range_request() {
    let (app, temp_dir) = create_app();
    fs::write(temp_dir.path().join("pixel.png"), b"0123456789").unwrap();

    let request = Request::get("/api/image?path=/pixel.png")
        .header(header::RANGE, "bytes=2-4")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(&response.body[..], b"234");
}

#[tokio::test]
async fn test_image_rejects_other_types() {
    let (app, _temp_dir) = create_app();

    let response = get(&app, "/api/image?path=/test.txt").await;
    assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(response.error_code(), ErrorCode::UnsupportedImage);

    let response = get(&app, "/api/image?path=/subdir").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), ErrorCode::NotAFile);
}

#[tokio::test]
async fn test_download_sets_attachment_header() {
    let (app, _temp_dir) = create_app();

    let response = get(&app, "/api/download?path=/subdir/nested.txt").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"nested.txt\""
    );
    assert_eq!(&response.body[..], b"Nested");
}

#[tokio::test]
async fn test_download_directory_rejected() {
    let (app, _temp_dir) = create_app();

    let response = get(&app, "/api/download?path=/subdir").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), ErrorCode::NotAFile);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_flat_and_recursive() {
    let (app, _temp_dir) = create_app();

    let flat: Vec<FileEntry> = get(&app, "/api/search?path=/&q=NEST").await.json();
    assert!(flat.is_empty());

    let recursive: Vec<FileEntry> = get(&app, "/api/search?path=/&q=NEST&recursive=true")
        .await
        .json();
    assert_eq!(recursive.len(), 1);
    assert_eq!(recursive[0].path, "/subdir/nested.txt");
}

#[tokio::test]
async fn test_search_respects_result_cap() {
    let (app, temp_dir) = create_app_with(|config| config.search_max_results = 3);
    for i in 0..10 {
        fs::write(temp_dir.path().join(format!("match-{i}.log")), "").unwrap();
    }

    let results: Vec<FileEntry> = get(&app, "/api/search?q=match&recursive=true")
        .await
        .json();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_search_missing_query_is_empty() {
    let (app, _temp_dir) = create_app();

    // An empty query never touches the filesystem, so the bad path is not an error.
    let response = get(&app, "/api/search?path=/nonexistent").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json::<Vec<FileEntry>>().is_empty());

    let response = get(&app, "/api/search?path=/nonexistent&q=x").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Health, methods and frontend
// =============================================================================

#[tokio::test]
async fn test_healthz() {
    let (app, _temp_dir) = create_app();

    let response = get(&app, "/healthz").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn test_method_not_allowed() {
    let (app, _temp_dir) = create_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/files?path=/")
        .body(Body::empty())
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.error_code(), ErrorCode::MethodNotAllowed);
}

#[tokio::test]
async fn test_unknown_route_serves_index() {
    let (app, _temp_dir) = create_app();

    let response = get(&app, "/some/client/route").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(response.text().contains("<base href=\"/\""));
}

#[tokio::test]
async fn test_base_path_is_stripped_and_substituted() {
    let (app, _temp_dir) = create_app_with(|config| config.base_path = "/files/".to_string());

    let response = get(&app, "/files/app.css").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[header::CONTENT_TYPE], "text/css");

    let response = get(&app, "/files/deep/link").await;
    assert!(response.text().contains("<base href=\"/files/\""));
    assert!(!response.text().contains("__BASE_PATH__"));
}
