//! Error types for the access crate.

use thiserror::Error;

/// Failure modes of path resolution and upload authorization.
///
/// None of the messages carry a resolved absolute path, so callers can
/// hand them back to clients without exposing the filesystem layout.
#[derive(Debug, Error)]
pub enum ShareError {
    /// The requested path normalizes to a location outside the root.
    #[error("path escapes the share root")]
    OutsideRoot,

    /// The target does not exist, has the wrong type, or was not named.
    #[error("{0}")]
    NotFound(String),

    /// The presented upload token matches neither credential.
    #[error("invalid upload token")]
    Unauthorized,

    /// Unexpected filesystem failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ShareError {
    pub(crate) fn no_file_provided() -> Self {
        ShareError::NotFound("no file provided".to_string())
    }

    pub(crate) fn directory_not_found(relative: &str) -> Self {
        ShareError::NotFound(format!("directory '{relative}' not found"))
    }

    pub(crate) fn file_not_found(relative: &str) -> Self {
        ShareError::NotFound(format!("file '{relative}' not found"))
    }
}

/// Result type alias for access operations.
pub type Result<T> = std::result::Result<T, ShareError>;
