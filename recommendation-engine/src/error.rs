use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error("Snapshot load error: {0}")]
    SnapshotLoad(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Implement conversions from other error types
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::SnapshotLoad(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SnapshotLoad(err.to_string())
    }
}
