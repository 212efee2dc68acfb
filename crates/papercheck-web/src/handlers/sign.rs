use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use papercheck_storage::StorageError;

use crate::models::{ErrorResponse, SignQuery};
use crate::state::AppState;

/// Content type signed when the client does not send one.
const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

pub async fn sign_s3(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SignQuery>,
) -> impl IntoResponse {
    // Reject bad names before touching storage config.
    if let Err(e) = papercheck_storage::sanitize_file_name(&query.file_name) {
        return error(StatusCode::BAD_REQUEST, e);
    }

    let content_type = if query.file_type.is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        query.file_type.as_str()
    };

    let signed = match state.signer().await {
        Ok(signer) => signer.sign(&query.file_name, content_type).await,
        Err(e) => Err(e),
    };

    match signed {
        Ok(signed) => {
            tracing::info!(key = %signed.key, content_type, "issued upload url");
            Json(signed).into_response()
        }
        Err(e @ StorageError::InvalidFileName(_)) => error(StatusCode::BAD_REQUEST, e),
        Err(e) => {
            tracing::error!(error = %e, "failed to sign upload");
            error(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

fn error(status: StatusCode, e: StorageError) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}
