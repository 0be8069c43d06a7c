//! Loaded model description

use axum::{extract::State, Json};

use fire_core::ModelSummary;

use crate::{AppError, AppResult, AppState};

/// Layout, encoders and training provenance of the served artifact
pub async fn info(State(state): State<AppState>) -> AppResult<Json<ModelSummary>> {
    let summary = state
        .predictor
        .summary()
        .cloned()
        .ok_or(AppError::ModelUnavailable)?;

    Ok(Json(summary))
}
