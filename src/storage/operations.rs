//! Storage operations
//!
//! Upload, download, preview, delete and folder creation. Every function
//! takes a [`ResolvedPath`]; none of them ever sees a raw client path.

use log::{error, info, warn};
use std::io;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use crate::config::PreviewExtensions;
use crate::error::ExplorerError;
use crate::storage::filetype::can_preview;
use crate::storage::results::{DeleteResult, Disposition, FileStream, UploadResult};
use crate::storage::validation::{ResolvedPath, sanitize_filename};

const BUFFER_SIZE: usize = 8192; // 8KB buffer

/// Writes `reader` into `target_dir` under the sanitized `file_name`.
///
/// The target directory tree is created if needed. Bytes go to a hidden
/// temporary sibling first and are renamed into place on success, so a
/// failed or oversized upload never leaves a truncated file behind.
pub async fn upload<R>(
    target_dir: &ResolvedPath,
    file_name: &str,
    mut reader: R,
    max_bytes: u64,
) -> Result<UploadResult, ExplorerError>
where
    R: AsyncRead + Unpin,
{
    let name = sanitize_filename(file_name)
        .ok_or_else(|| ExplorerError::BadRequest(format!("Invalid file name: {file_name:?}")))?;

    fs::create_dir_all(target_dir.as_path())
        .await
        .map_err(|e| match e.kind() {
            // The target "directory" is an existing file
            io::ErrorKind::AlreadyExists | io::ErrorKind::NotADirectory => {
                ExplorerError::NotFound(target_dir.relative().to_string())
            }
            _ => ExplorerError::from(e).at(target_dir.relative()),
        })?;

    let destination = target_dir.child(&name)?;
    if let Ok(existing) = fs::metadata(destination.as_path()).await {
        if existing.is_dir() {
            return Err(ExplorerError::BadRequest(format!(
                "A folder named '{name}' already exists"
            )));
        }
    }

    // Unique per upload so concurrent uploads of one name never share bytes
    let suffix = hex::encode(rand::random::<[u8; 8]>());
    let temp = target_dir.child(&format!(".{name}.{suffix}.part"))?;

    info!(
        "Starting file upload: '{}' -> '{}'",
        temp.relative(),
        destination.relative()
    );

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp.as_path())
        .await
        .map_err(|e| ExplorerError::from(e).at(destination.relative()))?;

    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut total_bytes_received = 0u64;

    let copied: Result<(), ExplorerError> = async {
        loop {
            let n = reader
                .read(&mut buffer)
                .await
                .map_err(|e| stream_error(e, max_bytes))?;
            if n == 0 {
                break;
            }

            // Check the limit BEFORE writing (fail fast)
            total_bytes_received += n as u64;
            if total_bytes_received > max_bytes {
                return Err(ExplorerError::TooLarge(max_bytes));
            }

            file.write_all(&buffer[..n]).await?;
        }
        file.flush().await?;
        Ok(())
    }
    .await;

    drop(file);

    if let Err(e) = copied {
        warn!("Upload of '{}' aborted: {e}", destination.relative());
        let _ = fs::remove_file(temp.as_path()).await;
        return Err(e);
    }

    if let Err(e) = fs::rename(temp.as_path(), destination.as_path()).await {
        error!(
            "Failed to move '{}' into place as '{}': {e}",
            temp.relative(),
            destination.relative()
        );
        let _ = fs::remove_file(temp.as_path()).await;
        return Err(ExplorerError::IoError(e));
    }

    info!(
        "File upload completed successfully: '{}' ({total_bytes_received} bytes)",
        destination.relative()
    );

    Ok(UploadResult {
        file_name: name,
        byte_count: total_bytes_received,
    })
}

/// The transport reports an exceeded body limit as `FileTooLarge`.
fn stream_error(error: io::Error, max_bytes: u64) -> ExplorerError {
    if error.kind() == io::ErrorKind::FileTooLarge {
        ExplorerError::TooLarge(max_bytes)
    } else {
        ExplorerError::IoError(error)
    }
}

/// Opens a file to be saved by the client
pub async fn open_download(path: &ResolvedPath) -> Result<FileStream, ExplorerError> {
    open_stream(path, Disposition::Attachment).await
}

/// Opens a file to be rendered inline.
///
/// Same as [`open_download`] but refuses types browsers cannot render. This
/// is a presentation gate only; containment was proven on resolution.
pub async fn open_preview(
    path: &ResolvedPath,
    tables: &PreviewExtensions,
) -> Result<FileStream, ExplorerError> {
    require_file(path).await?;
    // Judged by the name the client asked for, as in listings
    let name = path.file_name().unwrap_or_default();
    if !can_preview(name, tables) {
        return Err(ExplorerError::Unsupported(path.relative().to_string()));
    }
    open_stream(path, Disposition::Inline).await
}

async fn open_stream(
    path: &ResolvedPath,
    disposition: Disposition,
) -> Result<FileStream, ExplorerError> {
    let size = require_file(path).await?;
    let file = fs::File::open(path.as_path())
        .await
        .map_err(|e| ExplorerError::from(e).at(path.relative()))?;

    let file_name = path.file_name().unwrap_or("download").to_string();
    let content_type = mime_guess::from_path(&file_name)
        .first_or_octet_stream()
        .to_string();

    info!(
        "Streaming '{}' ({size} bytes, {disposition:?})",
        path.relative()
    );

    Ok(FileStream {
        file,
        file_name,
        size,
        content_type,
        disposition,
    })
}

/// Fails with NotFound unless `path` is an existing regular file; returns its size.
async fn require_file(path: &ResolvedPath) -> Result<u64, ExplorerError> {
    let metadata = fs::metadata(path.as_path())
        .await
        .map_err(|e| ExplorerError::from(e).at(path.relative()))?;

    if !metadata.is_file() {
        return Err(ExplorerError::NotFound(path.relative().to_string()));
    }
    Ok(metadata.len())
}

/// Deletes a file, a symlink, or a directory recursively.
///
/// Recursive removal is not atomic: a failure partway through leaves the
/// already-removed children gone and is reported as an I/O error.
pub async fn delete(path: &ResolvedPath) -> Result<DeleteResult, ExplorerError> {
    // A symlink is removed itself, never what it points to
    if let Ok(meta) = fs::symlink_metadata(path.entry()).await {
        if meta.file_type().is_symlink() {
            fs::remove_file(path.entry()).await.map_err(|e| {
                error!("Failed to delete link '{}': {e}", entry_name(path));
                ExplorerError::from(e).at(entry_name(path))
            })?;
            info!("Deleted link '{}'", entry_name(path));
            return Ok(DeleteResult::Link);
        }
    }

    if path.is_root() {
        warn!("Refusing to delete volume root {}", path.root().display());
        return Err(ExplorerError::AccessDenied("/".to_string()));
    }

    let metadata = fs::metadata(path.as_path())
        .await
        .map_err(|e| ExplorerError::from(e).at(path.relative()))?;

    if metadata.is_dir() {
        fs::remove_dir_all(path.as_path()).await.map_err(|e| {
            error!(
                "Recursive delete of '{}' failed, tree may be partially removed: {e}",
                path.relative()
            );
            ExplorerError::IoError(e)
        })?;
        info!("Deleted directory '{}'", path.relative());
        Ok(DeleteResult::Directory)
    } else {
        fs::remove_file(path.as_path()).await.map_err(|e| {
            error!("Failed to delete file '{}': {e}", path.relative());
            ExplorerError::from(e).at(path.relative())
        })?;
        info!("Deleted file '{}'", path.relative());
        Ok(DeleteResult::File)
    }
}

fn entry_name(path: &ResolvedPath) -> &str {
    path.file_name().unwrap_or_default()
}

/// Creates a directory and any missing parents. Succeeds if it already exists.
pub async fn make_directory(path: &ResolvedPath) -> Result<(), ExplorerError> {
    fs::create_dir_all(path.as_path()).await.map_err(|e| {
        error!("Failed to create directory '{}': {e}", path.relative());
        ExplorerError::from(e).at(path.relative())
    })?;
    info!("Created directory '{}'", path.relative());
    Ok(())
}
