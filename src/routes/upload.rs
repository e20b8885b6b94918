use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::StatusCode;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;
use crate::pipeline;
use crate::state::AppState;
use crate::types::activity::RawActivityFile;
use crate::types::workout::WorkoutSummary;

/// Multipart framing needs headroom above the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload))
}

/// Request body limit matching the configured file size.
pub fn body_limit(config: &Config) -> DefaultBodyLimit {
    DefaultBodyLimit::max(config.max_file_size + MULTIPART_OVERHEAD)
}

#[derive(Serialize, Deserialize)]
struct UploadResponse {
    id: i64,
    workout: WorkoutSummary,
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    let limit = state.config.max_file_size;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "Failed to read multipart field", limit))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            filename = field.file_name().map(|s| s.to_string());
            file_bytes = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, "Failed to read file bytes", limit))?
                    .to_vec(),
            );
        }
    }

    let bytes = file_bytes.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;
    let filename = filename.ok_or_else(|| AppError::BadRequest("No filename provided".to_string()))?;

    let file = RawActivityFile::new(&filename, &bytes);

    if !file.has_fit_extension() {
        tracing::warn!("Rejected upload {}: not a .fit file", filename);
        return Err(AppError::BadRequest(
            "Unsupported file format, expected a .fit file".to_string(),
        ));
    }

    if file.len() > limit {
        tracing::warn!("Rejected upload {}: {} bytes", filename, file.len());
        return Err(AppError::PayloadTooLarge { limit });
    }

    tracing::info!("Ingesting FIT file: {} ({} bytes)", filename, file.len());

    let stored = pipeline::ingest(&state.store, file).await.map_err(|e| {
        tracing::warn!(stage = e.stage().as_str(), "Upload {} failed: {}", filename, e);
        AppError::from(e)
    })?;

    Ok(Json(UploadResponse {
        id: stored.id,
        workout: stored.summary,
    }))
}

/// The body limit surfaces as a multipart read failure.
fn multipart_error(e: MultipartError, context: &str, limit: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        tracing::warn!("Rejected upload: body exceeds {} bytes", limit);
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::BadRequest(format!("{}: {}", context, e))
    }
}
