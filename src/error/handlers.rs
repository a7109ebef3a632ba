//! Error handlers
//!
//! Maps errors to HTTP status codes and logs them with the right severity.

use crate::error::types::{AuthError, ExplorerError};
use axum::http::StatusCode;
use log::{debug, error, warn};

/// Log an explorer error before it is turned into a response
pub fn handle_error(err: &ExplorerError) {
    match err {
        // Already logged with the volume root by the resolver
        ExplorerError::AccessDenied(path) => debug!("Access denied for {path:?}"),
        ExplorerError::IoError(e) => error!("Filesystem failure: {e}"),
        ExplorerError::PermissionDenied(_) => warn!("{err}"),
        _ => debug!("Request rejected: {err}"),
    }
}

/// Convert an explorer error to its HTTP status code
pub fn error_to_status_code(err: &ExplorerError) -> StatusCode {
    match err {
        ExplorerError::InvalidVolume(_) => StatusCode::BAD_REQUEST,
        ExplorerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ExplorerError::AccessDenied(_) => StatusCode::FORBIDDEN,
        ExplorerError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        ExplorerError::NotFound(_) => StatusCode::NOT_FOUND,
        ExplorerError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        ExplorerError::Unsupported(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ExplorerError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Convert an authentication error to its HTTP status code
pub fn auth_error_to_status_code(err: &AuthError) -> StatusCode {
    match err {
        AuthError::InvalidPassword => StatusCode::UNAUTHORIZED,
        AuthError::MalformedInput(_) => StatusCode::BAD_REQUEST,
        AuthError::NotLoggedIn => StatusCode::UNAUTHORIZED,
        AuthError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_every_kind_has_a_distinct_signal() {
        assert_eq!(
            error_to_status_code(&ExplorerError::InvalidVolume("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_to_status_code(&ExplorerError::AccessDenied("..".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            error_to_status_code(&ExplorerError::NotFound("a".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_to_status_code(&ExplorerError::TooLarge(1)),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            error_to_status_code(&ExplorerError::Unsupported("a.zip".into())),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            error_to_status_code(&ExplorerError::IoError(io::Error::other("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
