//! Prediction handler

use axum::{body::Bytes, extract::State, Json};
use serde::Serialize;

use fire_core::RiskAssessment;

use crate::{AppResult, AppState};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub assessment: RiskAssessment,
    pub status: &'static str,
}

/// Score one set of fire weather readings
///
/// The body is taken raw so that empty, non-JSON and non-object bodies all
/// produce the same `{"error": ...}` shape as field errors.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<PredictResponse>> {
    let assessment = state.predictor.predict_body(&body)?;

    tracing::debug!(
        "Prediction served: score={} level={}",
        assessment.risk_score,
        assessment.risk_level
    );

    Ok(Json(PredictResponse {
        assessment,
        status: "success",
    }))
}
