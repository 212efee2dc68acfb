use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use papercheck_scoring::GrammarCorrector;

use crate::models::{CorrectRequest, CorrectResponse, ErrorResponse};
use crate::state::AppState;

pub async fn correct(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CorrectRequest>,
) -> impl IntoResponse {
    match state.corrector.correct(&req.text).await {
        Ok(corrected) => Json(CorrectResponse { corrected }).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "grammar correction failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
