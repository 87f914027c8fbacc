use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use service::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

pub const LOAD_FAILED: &str = "Failed to load configuration";
pub const SAVE_FAILED: &str = "Failed to save configuration";
pub const INVALID_DATA: &str = "Invalid data. Please ensure the data is in JSON format.";
pub const DUPLICATE_TOKEN: &str = "Duplicate token";

/// Request-boundary error: every `ServiceError` ends up as a plain-text response.
/// The detailed cause is logged, the client only sees a fixed message.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self.0 {
            ServiceError::ConfigLoad(_) => (StatusCode::INTERNAL_SERVER_ERROR, LOAD_FAILED),
            ServiceError::ConfigSave(_) => (StatusCode::INTERNAL_SERVER_ERROR, SAVE_FAILED),
            ServiceError::InvalidData(_) => (StatusCode::BAD_REQUEST, INVALID_DATA),
            ServiceError::DuplicateToken(_) => (StatusCode::CONFLICT, DUPLICATE_TOKEN),
        };
        if status.is_server_error() {
            error!(error = %self.0, %status, "request failed");
        } else {
            warn!(error = %self.0, %status, "request rejected");
        }
        (status, msg).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid bind address {addr}: {source}")]
    InvalidAddr {
        addr: String,
        source: std::net::AddrParseError,
    },
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
