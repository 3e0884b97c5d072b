//! # file-browser
//!
//! A read-only HTTP view of one local directory tree: listing, text preview,
//! image display, download and name search, plus an embedded single-page
//! frontend.
//!
//! ## Overview
//!
//! All filesystem access goes through [`files::SandboxRoot::resolve`], which
//! turns an untrusted request path into a [`files::ResolvedPath`] that is
//! lexically inside the root and crosses no symlink. Listing, preview and
//! search accept nothing else.
//!
//! ```text
//!   HTTP request ──► http::handlers ──► SandboxRoot::resolve ──► files::{listing, preview, search}
//!                          │                                          │
//!                          └────────── ApiError (status + code) ◄─────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use file_browser::{router, AppState, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Config::default().validate()?;
//!     let app = router(AppState::new(&settings));
//!
//!     let listener = tokio::net::TcpListener::bind(settings.addr()).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Layered configuration and validation
//! - [`files`]: Path resolution and read-only filesystem operations
//! - [`http`]: Routes, handlers and error rendering
//! - [`assets`]: Embedded frontend and SPA fallback

pub mod assets;
pub mod config;
pub mod files;
pub mod http;

// Re-export protocol for convenience
pub use protocol;

pub use config::{Config, ConfigError, ConfigOverrides, Settings};
pub use files::{FileError, ResolvedPath, SandboxRoot};
pub use http::{router, ApiError, AppState};
