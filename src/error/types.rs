//! Error types
//!
//! Defines the error taxonomy shared by the volume, storage and usage layers,
//! plus the authentication errors raised at the HTTP boundary.

use std::fmt;
use std::io;

/// Errors produced by volume lookup, path resolution and file operations.
///
/// String payloads are client-facing (volume ids, client-relative paths);
/// absolute host paths never end up in here.
#[derive(Debug)]
pub enum ExplorerError {
    InvalidVolume(String),
    AccessDenied(String),
    NotFound(String),
    PermissionDenied(String),
    TooLarge(u64),
    Unsupported(String),
    BadRequest(String),
    IoError(io::Error),
}

impl ExplorerError {
    /// Stable, machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ExplorerError::InvalidVolume(_) => "InvalidVolume",
            ExplorerError::AccessDenied(_) => "AccessDenied",
            ExplorerError::NotFound(_) => "NotFound",
            ExplorerError::PermissionDenied(_) => "PermissionDenied",
            ExplorerError::TooLarge(_) => "TooLarge",
            ExplorerError::Unsupported(_) => "Unsupported",
            ExplorerError::BadRequest(_) => "BadRequest",
            ExplorerError::IoError(_) => "IOError",
        }
    }

    /// Replaces a `NotFound`/`PermissionDenied` payload with the client path.
    ///
    /// `From<io::Error>` has no path to attach, so operations call this once
    /// they know which client-relative path failed.
    pub fn at(self, relative: &str) -> Self {
        match self {
            ExplorerError::NotFound(_) => ExplorerError::NotFound(relative.to_string()),
            ExplorerError::PermissionDenied(_) => {
                ExplorerError::PermissionDenied(relative.to_string())
            }
            other => other,
        }
    }
}

impl fmt::Display for ExplorerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExplorerError::InvalidVolume(v) => write!(f, "Invalid drive: {}", v),
            ExplorerError::AccessDenied(p) => write!(f, "Access denied: {}", p),
            ExplorerError::NotFound(p) => write!(f, "Path not found: {}", p),
            ExplorerError::PermissionDenied(p) => write!(f, "Permission denied: {}", p),
            ExplorerError::TooLarge(max) => write!(
                f,
                "File too large. Maximum size: {}",
                crate::storage::filetype::human_size(*max)
            ),
            ExplorerError::Unsupported(p) => write!(f, "Preview not supported: {}", p),
            ExplorerError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ExplorerError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ExplorerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExplorerError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ExplorerError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => ExplorerError::NotFound(String::new()),
            io::ErrorKind::PermissionDenied => ExplorerError::PermissionDenied(String::new()),
            _ => ExplorerError::IoError(error),
        }
    }
}

/// Authentication errors
#[derive(Debug)]
pub enum AuthError {
    InvalidPassword,
    MalformedInput(String),
    NotLoggedIn,
    RateLimited(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidPassword => write!(f, "Invalid password"),
            AuthError::MalformedInput(s) => write!(f, "Malformed input: {}", s),
            AuthError::NotLoggedIn => write!(f, "Authentication required"),
            AuthError::RateLimited(ip) => write!(f, "Too many login attempts from {}", ip),
        }
    }
}

impl std::error::Error for AuthError {}

/// Disk usage query errors. Callers only ever see these as "unavailable".
#[derive(Debug)]
pub enum UsageError {
    Spawn(io::Error),
    Timeout(u64),
    Failed(String),
    Parse(String),
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::Spawn(e) => write!(f, "Failed to run disk usage query: {}", e),
            UsageError::Timeout(secs) => write!(f, "Disk usage query timed out after {}s", secs),
            UsageError::Failed(msg) => write!(f, "Disk usage query failed: {}", msg),
            UsageError::Parse(msg) => write!(f, "Unexpected disk usage output: {}", msg),
        }
    }
}

impl std::error::Error for UsageError {}

impl From<io::Error> for UsageError {
    fn from(error: io::Error) -> Self {
        UsageError::Spawn(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_are_classified() {
        let err: ExplorerError = io::Error::from(io::ErrorKind::NotFound).into();
        assert_eq!(err.kind(), "NotFound");

        let err: ExplorerError = io::Error::from(io::ErrorKind::PermissionDenied).into();
        assert_eq!(err.kind(), "PermissionDenied");

        let err: ExplorerError = io::Error::other("disk on fire").into();
        assert_eq!(err.kind(), "IOError");
    }

    #[test]
    fn test_at_attaches_client_path() {
        let err = ExplorerError::from(io::Error::from(io::ErrorKind::NotFound)).at("docs/a.txt");
        assert_eq!(err.to_string(), "Path not found: docs/a.txt");
    }

    #[test]
    fn test_too_large_message_is_human_readable() {
        let err = ExplorerError::TooLarge(5 * 1024 * 1024 * 1024);
        assert_eq!(err.to_string(), "File too large. Maximum size: 5.00 GB");
    }
}
