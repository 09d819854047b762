//! # RPC Errors
//!
//! Maps content failures onto HTTP statuses and the error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::error::ContentError;
use crate::model::ValidationError;

/// Result type for RPC handlers
pub type RpcResult<T> = Result<T, RpcError>;

/// RPC errors
#[derive(Debug, Error)]
pub enum RpcError {
    /// Request input could not be decoded
    #[error(transparent)]
    Input(#[from] ValidationError),

    /// The procedure itself failed
    #[error(transparent)]
    Content(#[from] ContentError),

    /// No procedure is registered under this path
    #[error("Unknown procedure: {0}")]
    UnknownProcedure(String),
}

impl RpcError {
    /// Error for a payload that does not decode into the procedure's input.
    pub fn malformed(reason: impl std::fmt::Display) -> Self {
        RpcError::Input(ValidationError::Malformed(reason.to_string()))
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RpcError::Input(_) => StatusCode::BAD_REQUEST,
            RpcError::Content(ContentError::Validation(_)) => StatusCode::BAD_REQUEST,
            RpcError::Content(ContentError::NotFound { .. }) => StatusCode::NOT_FOUND,
            RpcError::UnknownProcedure(_) => StatusCode::NOT_FOUND,
            RpcError::Content(ContentError::Conflict { .. }) => StatusCode::CONFLICT,
            RpcError::Content(ContentError::InvalidRow { .. } | ContentError::Storage(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// True when the caller sent something this server will never accept.
    pub fn is_client_error(&self) -> bool {
        match self {
            RpcError::Input(_) | RpcError::UnknownProcedure(_) => true,
            RpcError::Content(err) => err.is_client_error(),
        }
    }

    /// Machine-readable code carried in the error body
    pub fn code(&self) -> &'static str {
        match self.status_code() {
            StatusCode::BAD_REQUEST => "BAD_REQUEST",
            StatusCode::NOT_FOUND => "NOT_FOUND",
            StatusCode::CONFLICT => "CONFLICT",
            _ => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Error response body: `{"error": {"code": .., "message": ..}}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl From<&RpcError> for ErrorResponse {
    fn from(err: &RpcError) -> Self {
        // Storage details stay in the log
        let message = if err.is_client_error() {
            err.to_string()
        } else {
            "Internal server error".to_string()
        };
        Self {
            error: ErrorBody {
                code: err.code(),
                message,
            },
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_client_error() {
            tracing::debug!(status = status.as_u16(), error = %self, "RPC request rejected");
        } else {
            tracing::error!(error = %self, "RPC procedure failed");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
