use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to access data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode entries: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("display name must not be empty")]
    EmptyDisplayName,

    #[error("authentication failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("view controller has shut down")]
pub struct ControllerClosed;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unavailable(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: err.to_string(),
        }
    }
}

impl From<ControllerClosed> for AppError {
    fn from(err: ControllerClosed) -> Self {
        Self::unavailable(err)
    }
}

impl From<crate::models::UnknownMood> for AppError {
    fn from(err: crate::models::UnknownMood) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
