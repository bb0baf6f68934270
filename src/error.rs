//! Error handling

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::info;

use crate::imaging::ImagingError;

/// definitions for the kutego application.
#[derive(Debug)]
pub enum KutegoError {
    /// When you didn't do the right thing
    BadRequest(String),
    /// When a requested resource is not found
    NotFound(String),
    /// When GitHub (or whatever is standing in for it) misbehaves
    Upstream(String),
    /// When an internal server error occurs
    InternalServerError(String),
}

impl std::fmt::Display for KutegoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(message) => write!(f, "Bad request: {message}"),
            Self::NotFound(message) => write!(f, "Not found: {message}"),
            Self::Upstream(message) => write!(f, "Upstream error: {message}"),
            Self::InternalServerError(message) => write!(f, "Internal server error: {message}"),
        }
    }
}

impl std::error::Error for KutegoError {}

impl From<std::io::Error> for KutegoError {
    fn from(err: std::io::Error) -> Self {
        KutegoError::InternalServerError(err.to_string())
    }
}

impl From<axum::http::Error> for KutegoError {
    fn from(err: axum::http::Error) -> Self {
        KutegoError::InternalServerError(err.to_string())
    }
}

impl From<url::ParseError> for KutegoError {
    fn from(err: url::ParseError) -> Self {
        KutegoError::InternalServerError(err.to_string())
    }
}

impl From<reqwest::Error> for KutegoError {
    fn from(err: reqwest::Error) -> Self {
        KutegoError::Upstream(err.to_string())
    }
}

impl From<ImagingError> for KutegoError {
    fn from(err: ImagingError) -> Self {
        KutegoError::InternalServerError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for KutegoError {
    fn from(err: tokio::task::JoinError) -> Self {
        KutegoError::InternalServerError(format!("image task failed: {err}"))
    }
}

impl KutegoError {
    /// The HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            KutegoError::BadRequest(_) => StatusCode::BAD_REQUEST,
            KutegoError::NotFound(_) => StatusCode::NOT_FOUND,
            KutegoError::Upstream(_) => StatusCode::BAD_GATEWAY,
            KutegoError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for KutegoError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        // internal details stay in the log
        let message = match self {
            KutegoError::BadRequest(message) => {
                info!("Bad request received: {message}");
                message
            }
            KutegoError::NotFound(message) => {
                info!("404 {message}");
                message
            }
            KutegoError::Upstream(message) => {
                tracing::error!("Upstream error: {}", message);
                "Failed to talk to the cat repository".to_string()
            }
            KutegoError::InternalServerError(message) => {
                tracing::error!("Internal server error: {}", message);
                "Internal server error".to_string()
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
