//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use fire_core::ValidationMode;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model_loaded: bool,
    validation_mode: ValidationMode,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model_loaded: state.predictor.is_loaded(),
        validation_mode: state.predictor.validator().mode(),
    })
}
