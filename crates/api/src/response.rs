//! Shared response envelope types for API handlers.
//!
//! All successful API responses use a `{ "data": ... }` envelope. Use
//! [`DataResponse`] instead of ad-hoc `serde_json::json!({ "data": ... })`.
//! File downloads are the exception: they carry the bare document plus a
//! `Content-Disposition` header from [`attachment`].

use serde::{Deserialize, Serialize};

/// Standard `{ "data": T }` response envelope.
///
/// Also deserializable so HTTP clients can unwrap it.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// `Content-Disposition` value offering the body as a file download.
///
/// `file_name` must not contain quotes.
pub fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{file_name}\"")
}
