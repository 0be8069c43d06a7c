//! Forest Fire Prediction API
//!
//! Serves a trained fire classifier over HTTP.
//!
//! # Routes
//!
//! ```text
//! GET  /         liveness message
//! GET  /health   status, version, model_loaded
//! GET  /model    artifact layout, encoders, training provenance
//! POST /predict  fire weather readings → {fire_risk, risk_score, risk_level}
//! ```

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

use fire_core::{ModelArtifact, Predictor, Validator};

pub use config::Config;
pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
}

impl AppState {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
        }
    }
}

/// Load the artifact named by the config.
///
/// Without `model_required` a missing or unreadable artifact is logged and
/// the service starts unloaded; every prediction then answers 500.
pub fn load_predictor(config: &Config) -> anyhow::Result<Predictor> {
    match ModelArtifact::load(&config.model_path) {
        Ok(artifact) => {
            tracing::info!(
                "Model loaded: {} trees, {} training rows, checksum {}",
                artifact.forest.n_trees(),
                artifact.metadata.training_rows,
                &artifact.checksum[..12.min(artifact.checksum.len())]
            );
            Ok(Predictor::from_artifact(artifact, config.validation_mode))
        }
        Err(e) if !config.model_required => {
            tracing::warn!("{} - predictions will fail until a model is trained", e);
            Ok(Predictor::unloaded(Validator::new(config.validation_mode)))
        }
        Err(e) => Err(e).with_context(|| {
            format!("MODEL_REQUIRED is set and {} could not be loaded", config.model_path.display())
        }),
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root::index))
        .route("/health", get(handlers::health::check))
        .route("/model", get(handlers::model::info))
        .route("/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
