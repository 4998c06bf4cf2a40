use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::chunking::ChunkingError;
use crate::extraction::ExtractionError;
use crate::index::IndexError;
use crate::llm_client::LlmError;
use crate::retrieval::RetrievalError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Pipeline failures carry their stage as the error code and their message
/// verbatim so callers can tell which step broke.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Generation error: {0}")]
    Generation(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge(
                "upload exceeds the maximum allowed size".to_string(),
            );
        }
        AppError::Validation(format!("invalid multipart body: {}", e.body_text()))
    }
}

impl AppError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            AppError::Extraction(_) => (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_ERROR"),
            AppError::Chunking(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CHUNKING_ERROR"),
            AppError::Index(_) => (StatusCode::BAD_GATEWAY, "INDEX_ERROR"),
            AppError::Retrieval(_) => (StatusCode::BAD_GATEWAY, "RETRIEVAL_ERROR"),
            AppError::Generation(_) => (StatusCode::BAD_GATEWAY, "GENERATION_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Validation(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => {
                tracing::warn!("Rejected upload: {msg}");
                msg.clone()
            }
            AppError::Extraction(e) => {
                tracing::warn!("Extraction error: {e}");
                e.to_string()
            }
            AppError::Chunking(e) => {
                tracing::error!("Chunking error: {e}");
                e.to_string()
            }
            AppError::Index(e) => {
                tracing::error!("Index error: {e}");
                e.to_string()
            }
            AppError::Retrieval(e) => {
                tracing::error!("Retrieval error: {e}");
                e.to_string()
            }
            AppError::Generation(e) => {
                tracing::error!("Generation error: {e}");
                e.to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
