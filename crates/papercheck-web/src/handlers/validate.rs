use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::models::ValidateError;
use crate::state::AppState;
use crate::upload::{self, UploadError};

pub async fn validate(State(state): State<Arc<AppState>>, multipart: Multipart) -> impl IntoResponse {
    let file = match upload::parse_multipart(multipart).await {
        Ok(file) => file,
        Err(e @ UploadError::Missing) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidateError::new(e.to_string())),
            )
                .into_response();
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to read upload");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ValidateError::new(e.to_string())),
            )
                .into_response();
        }
    };

    let filename = file.filename;
    let size = file.data.len();
    let backend = Arc::clone(&state.backend);

    // MuPDF is blocking
    let result = tokio::task::spawn_blocking(move || {
        papercheck_core::validate_bytes(&file.data, backend.as_ref())
    })
    .await;

    match result {
        Ok(result) => {
            tracing::info!(
                file = %filename,
                bytes = size,
                valid = result.is_valid(),
                reason = result.reason().unwrap_or(""),
                "validated upload"
            );
            Json(result).into_response()
        }
        Err(e) => {
            tracing::error!(file = %filename, error = %e, "validation task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ValidateError::new(e.to_string())),
            )
                .into_response()
        }
    }
}
