//! Error types for the Learning Notes API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notes_core::{StoreError, ValidationErrors};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Request body is not parseable JSON
    #[error("Invalid JSON body: {0}")]
    InvalidJson(String),

    /// Query string could not be decoded
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// Body failed its collection schema
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Document store failure, including "store unavailable"
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(_) | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(StoreError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::InvalidQuery(_) => "INVALID_QUERY",
            ApiError::Validation(_) => "VALIDATION_FAILED",
            ApiError::Store(StoreError::Unavailable) => "STORE_UNAVAILABLE",
            ApiError::Store(_) => "STORE_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), "{}", self);
        }

        let details = match &self {
            ApiError::Validation(errors) => serde_json::to_value(&errors.errors).ok(),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}
