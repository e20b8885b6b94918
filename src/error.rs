use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("not a FIT file: {0}")]
    InvalidFormat(String),
    #[error("file ends unexpectedly at byte {offset}")]
    Truncated { offset: usize },
    #[error("checksum mismatch (expected {expected:#06x}, computed {actual:#06x})")]
    ChecksumMismatch { expected: u16, actual: u16 },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: {reason}")]
    InvariantViolated { field: &'static str, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored workout {id} is unreadable: {reason}")]
    CorruptRow { id: i64, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Decode,
    Validate,
    Persist,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Decode => "decode",
            Stage::Validate => "validate",
            Stage::Persist => "persist",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("could not read file: {0}")]
    Decode(#[from] DecodeError),
    #[error("invalid workout: {0}")]
    Validation(#[from] ValidationError),
    #[error("could not save workout: {0}")]
    PersistenceFailed(#[source] StoreError),
}

impl IngestError {
    pub fn stage(&self) -> Stage {
        match self {
            IngestError::Decode(_) => Stage::Decode,
            IngestError::Validation(_) => Stage::Validate,
            IngestError::PersistenceFailed(_) => Stage::Persist,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Workout not found: {0}")]
    NotFound(i64),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("File too large (limit {limit} bytes)")]
    PayloadTooLarge { limit: usize },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, stage) = match &self {
            AppError::Ingest(err) => match err.stage() {
                Stage::Decode | Stage::Validate => (StatusCode::BAD_REQUEST, Some(err.stage())),
                Stage::Persist => (StatusCode::INTERNAL_SERVER_ERROR, Some(err.stage())),
            },
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            AppError::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, None),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = match stage {
            Some(stage) => Json(json!({
                "error": self.to_string(),
                "stage": stage.as_str(),
            })),
            None => Json(json!({
                "error": self.to_string()
            })),
        };

        (status, body).into_response()
    }
}
