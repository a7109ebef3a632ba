//! Response handling
//!
//! Turns errors and opened files into HTTP responses.

use axum::Json;
use axum::body::Body;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use tokio_util::io::ReaderStream;

use crate::error::handlers::{auth_error_to_status_code, error_to_status_code, handle_error};
use crate::error::{AuthError, ExplorerError};
use crate::storage::{Disposition, Entry, FileStream};
use crate::usage::VolumeUsage;

/// Body of every successful mutation
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

impl SuccessResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub items: Vec<Entry>,
    pub path: String,
    pub drive: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub size: u64,
}

#[derive(Debug, Serialize)]
pub struct DriveInfo {
    pub drive: String,
    pub info: Option<VolumeUsage>,
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub drive: String,
    pub available: bool,
    pub usage: Option<VolumeUsage>,
}

impl IntoResponse for ExplorerError {
    fn into_response(self) -> Response {
        handle_error(&self);
        let status = error_to_status_code(&self);
        let message = match &self {
            // io::Error text can carry host paths
            ExplorerError::IoError(_) => "Filesystem operation failed".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message, "kind": self.kind() }))).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = auth_error_to_status_code(&self);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Streams an opened file with type, length and disposition headers
pub fn file_response(stream: FileStream) -> Response {
    let disposition = content_disposition(stream.disposition, &stream.file_name);
    let body = Body::from_stream(ReaderStream::new(stream.file));

    (
        [
            (CONTENT_TYPE, stream.content_type),
            (CONTENT_LENGTH, stream.size.to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

/// Both an ASCII fallback `filename` and the exact RFC 5987 `filename*`
pub fn content_disposition(disposition: Disposition, file_name: &str) -> String {
    let kind = match disposition {
        Disposition::Attachment => "attachment",
        Disposition::Inline => "inline",
    };
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "{kind}; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )
}
