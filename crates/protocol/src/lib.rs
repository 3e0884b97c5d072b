//! # file-browser Protocol Library
//!
//! Wire types for the file-browser HTTP API.
//!
//! ## Overview
//!
//! The server speaks plain JSON over HTTP. This crate holds the shapes of the
//! bodies it returns so that the server, its tests and any Rust client agree on
//! field names without duplicating them:
//!
//! - **Listing records**: [`FileEntry`] for `/api/files` and `/api/search`
//! - **Preview window**: [`PreviewResponse`] for `/api/preview`
//! - **Errors**: [`ErrorBody`] and the machine-readable [`ErrorCode`]
//!
//! ## Example Usage
//!
//! ```rust
//! use protocol::{ErrorBody, ErrorCode};
//!
//! let body = ErrorBody::new(ErrorCode::InvalidPath, "access denied");
//! assert_eq!(body.code.as_str(), "INVALID_PATH");
//! ```
//!
//! ## Modules
//!
//! - [`messages`]: Success response bodies
//! - [`error`]: Error body and error codes

pub mod error;
pub mod messages;

pub use error::{ErrorBody, ErrorCode};
pub use messages::{EntryKind, FileEntry, HealthResponse, PreviewResponse};
