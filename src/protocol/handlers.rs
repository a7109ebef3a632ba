//! Request handlers for the drive explorer API.
//!
//! Each handler validates the volume id, routes the client path through the
//! resolver and hands the resulting [`ResolvedPath`] to the storage layer.
//! Session checks happen in middleware before any of these run.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{ConnectInfo, Multipart, Query, State};
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use futures::TryStreamExt;
use log::{info, warn};
use serde_json::json;
use std::io;
use std::net::SocketAddr;
use tokio_util::io::StreamReader;

use crate::auth::{SESSION_COOKIE, validate_password};
use crate::error::{AuthError, ExplorerError};
use crate::middleware::session_token;
use crate::protocol::requests::{DriveParams, LoginRequest, MkdirRequest, TargetParams};
use crate::protocol::responses::{
    BrowseResponse, DriveInfo, SuccessResponse, UploadResponse, UsageResponse, file_response,
};
use crate::server::AppState;
use crate::storage::operations;
use crate::storage::{ResolvedPath, list_directory, resolve, sanitize_filename};

/// Resolves `drive` + `path` into a checked filesystem target.
fn resolve_target(state: &AppState, drive: &str, path: &str) -> Result<ResolvedPath, ExplorerError> {
    let volume = state.volumes.resolve_volume(drive)?;
    resolve(volume.root(), path)
}

/// Handles login: checks the shared secret and issues a session cookie.
pub async fn login(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, AuthError> {
    let client = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !state.login_limiter.lock().await.is_allowed(&client) {
        warn!("Login rate limit hit for {client}");
        return Err(AuthError::RateLimited(client));
    }

    if let Err(e) = validate_password(&request.password, &state.config) {
        warn!("Failed login from {client}: {e}");
        return Err(e);
    }

    let token = state.sessions.write().await.issue();
    info!("Client {client} logged in");

    let cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        state.config.session_ttl_secs
    );
    Ok(([(SET_COOKIE, cookie)], Json(json!({ "success": true }))).into_response())
}

/// Handles logout: revokes the session and clears the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.write().await.revoke(token);
    }
    let cleared = format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0");
    ([(SET_COOKIE, cleared)], Json(json!({ "success": true }))).into_response()
}

/// Lists mounted volumes with their usage, `null` where usage is unavailable.
pub async fn drives(State(state): State<AppState>) -> Json<Vec<DriveInfo>> {
    let mut drives = Vec::with_capacity(state.volumes.len());

    for volume in state.volumes.iter() {
        if !volume.is_mounted() {
            continue;
        }
        let info = match state.usage.usage(volume.root()).await {
            Ok(usage) => Some(usage),
            Err(e) => {
                warn!("Usage unavailable for drive {}: {e}", volume.id());
                None
            }
        };
        drives.push(DriveInfo {
            drive: volume.id().to_string(),
            info,
        });
    }

    Json(drives)
}

/// Reports usage for one volume.
pub async fn usage(
    State(state): State<AppState>,
    Query(params): Query<DriveParams>,
) -> Result<Json<UsageResponse>, ExplorerError> {
    let drive = params
        .drive
        .filter(|drive| !drive.is_empty())
        .ok_or_else(|| ExplorerError::BadRequest("Missing parameters".into()))?;
    let volume = state.volumes.resolve_volume(&drive)?;

    let usage = match state.usage.usage(volume.root()).await {
        Ok(usage) => Some(usage),
        Err(e) => {
            warn!("Usage unavailable for drive {drive}: {e}");
            None
        }
    };

    Ok(Json(UsageResponse {
        drive,
        available: usage.is_some(),
        usage,
    }))
}

/// Lists a directory.
pub async fn browse(
    State(state): State<AppState>,
    Query(params): Query<TargetParams>,
) -> Result<Json<BrowseResponse>, ExplorerError> {
    let drive = params.drive()?;
    let dir = resolve_target(&state, drive, &params.path)?;
    let items = list_directory(&dir, &state.config.preview).await?;

    Ok(Json(BrowseResponse {
        items,
        path: dir.relative().to_string(),
        drive: drive.to_string(),
    }))
}

/// Handles a multipart upload.
///
/// The `drive` and `path` fields must come before `file` so the bytes can be
/// streamed straight to disk.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ExplorerError> {
    let max_bytes = state.config.max_file_size;
    let mut drive: Option<String> = None;
    let mut path = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "drive" => {
                drive = Some(field.text().await.map_err(|e| multipart_error(e, max_bytes))?);
            }
            "path" => {
                path = field.text().await.map_err(|e| multipart_error(e, max_bytes))?;
            }
            "file" => {
                let drive = drive.as_deref().filter(|d| !d.is_empty()).ok_or_else(|| {
                    ExplorerError::BadRequest("'drive' must be sent before 'file'".into())
                })?;
                let target = resolve_target(&state, drive, &path)?;
                let file_name = field.file_name().unwrap_or_default().to_string();

                let reader = StreamReader::new(field.map_err(multipart_to_io));
                tokio::pin!(reader);

                let result = operations::upload(&target, &file_name, reader, max_bytes).await?;
                return Ok(Json(UploadResponse {
                    success: true,
                    message: format!("File uploaded: {}", result.file_name),
                    filename: result.file_name,
                    size: result.byte_count,
                }));
            }
            _ => {}
        }
    }

    Err(ExplorerError::BadRequest("No file provided".into()))
}

/// Body-limit overflows become `FileTooLarge` so storage reports TooLarge.
fn multipart_to_io(error: MultipartError) -> io::Error {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        io::Error::new(io::ErrorKind::FileTooLarge, error.body_text())
    } else {
        io::Error::other(error.body_text())
    }
}

fn multipart_error(error: MultipartError, max_bytes: u64) -> ExplorerError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ExplorerError::TooLarge(max_bytes)
    } else {
        ExplorerError::BadRequest(error.body_text())
    }
}

/// Streams a file as an attachment.
pub async fn download(
    State(state): State<AppState>,
    Query(params): Query<TargetParams>,
) -> Result<Response, ExplorerError> {
    let target = resolve_target(&state, params.drive()?, params.required_path()?)?;
    let stream = operations::open_download(&target).await?;
    Ok(file_response(stream))
}

/// Streams a previewable file inline.
pub async fn preview(
    State(state): State<AppState>,
    Query(params): Query<TargetParams>,
) -> Result<Response, ExplorerError> {
    let target = resolve_target(&state, params.drive()?, params.required_path()?)?;
    let stream = operations::open_preview(&target, &state.config.preview).await?;
    Ok(file_response(stream))
}

/// Deletes a file or folder.
pub async fn delete(
    State(state): State<AppState>,
    Json(params): Json<TargetParams>,
) -> Result<Json<SuccessResponse>, ExplorerError> {
    let target = resolve_target(&state, params.drive()?, params.required_path()?)?;
    operations::delete(&target).await?;
    Ok(SuccessResponse::new("Item deleted"))
}

/// Creates a folder below `path`.
pub async fn mkdir(
    State(state): State<AppState>,
    Json(request): Json<MkdirRequest>,
) -> Result<Json<SuccessResponse>, ExplorerError> {
    let drive = request
        .drive
        .as_deref()
        .filter(|drive| !drive.is_empty())
        .ok_or_else(|| ExplorerError::BadRequest("Missing parameters".into()))?;
    if request.folder_name.is_empty() {
        return Err(ExplorerError::BadRequest("Missing parameters".into()));
    }
    let folder_name = sanitize_filename(&request.folder_name).ok_or_else(|| {
        ExplorerError::BadRequest(format!("Invalid folder name: {:?}", request.folder_name))
    })?;

    let parent = resolve_target(&state, drive, &request.path)?;
    let target = parent.child(&folder_name)?;
    operations::make_directory(&target).await?;
    Ok(SuccessResponse::new("Folder created"))
}
