//! File upload endpoint for Creative Studio
//!
//! A small axum service that stores multipart uploads on disk and serves
//! them back:
//!
//! - `POST /api/upload` with a `file` field stores the file under a random
//!   name and returns its metadata
//! - `GET /uploads/<filename>` serves a stored file
//! - `GET /api/health` answers `OK`

pub mod constants;
pub mod error;
pub mod server;

pub use error::{Result, UploadError};
pub use server::{router, serve, StoredFile, UploadConfig, UploadResponse};
