//! Mapping of core errors to HTTP responses.

use std::fmt::Display;

use access::ShareError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// An error response: status code plus a short client-safe message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Map an error from a read-only route (listing, download).
    ///
    /// Confinement violations read as "not found" so probing cannot tell
    /// an escape attempt from a missing file.
    pub fn lookup(err: ShareError) -> Self {
        match err {
            ShareError::OutsideRoot => Self::new(StatusCode::NOT_FOUND, "not found"),
            ShareError::NotFound(message) => Self::new(StatusCode::NOT_FOUND, message),
            ShareError::Unauthorized => Self::new(StatusCode::UNAUTHORIZED, err.to_string()),
            ShareError::Io(e) => Self::internal(e),
        }
    }

    /// Map an error from the upload route.
    pub fn upload(err: ShareError) -> Self {
        match err {
            ShareError::Unauthorized => {
                Self::new(StatusCode::UNAUTHORIZED, "Invalid upload token")
            }
            ShareError::OutsideRoot | ShareError::NotFound(_) => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            ShareError::Io(e) => Self::internal(e),
        }
    }

    /// Log an unexpected failure and hide its details from the client.
    pub fn internal(err: impl Display) -> Self {
        tracing::error!("Request failed: {}", err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            detail: &self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_mapping() {
        assert_eq!(
            ApiError::lookup(ShareError::OutsideRoot).status(),
            StatusCode::NOT_FOUND
        );
        let err = ApiError::lookup(ShareError::NotFound("file 'x' not found".to_string()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "file 'x' not found");
        assert_eq!(
            ApiError::lookup(std::io::Error::other("boom").into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upload_mapping() {
        assert_eq!(
            ApiError::upload(ShareError::Unauthorized).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::upload(ShareError::OutsideRoot).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::upload(ShareError::NotFound("no file provided".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_hides_details() {
        let err = ApiError::internal("/secret/location exploded");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("/secret"));
    }
}
