//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use fire_core::{PredictError, ValidationError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Client errors
    MissingField(String),
    InvalidType(String),
    EmptyPayload,
    MalformedBody(String),

    // Server precondition
    ModelUnavailable,

    // Generic errors
    InternalError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingField(_)
            | AppError::InvalidType(_)
            | AppError::EmptyPayload
            | AppError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            AppError::ModelUnavailable | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::MissingField(field) => format!("Missing field: {}", field),
            AppError::InvalidType(msg) => msg,
            AppError::EmptyPayload => "No data provided".to_string(),
            AppError::MalformedBody(msg) => msg,
            AppError::ModelUnavailable => {
                tracing::warn!("Prediction requested but no model is loaded");
                "Model not loaded. Please train the model first.".to_string()
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingField(field) => AppError::MissingField(field),
            ValidationError::EmptyPayload => AppError::EmptyPayload,
            ValidationError::MalformedBody(_) => AppError::MalformedBody(err.to_string()),
            ValidationError::InvalidType { .. } => AppError::InvalidType(err.to_string()),
        }
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Validation(e) => e.into(),
            PredictError::ModelUnavailable => AppError::ModelUnavailable,
            PredictError::Classifier(_) | PredictError::InvalidProbability(_) => {
                AppError::InternalError(err.to_string())
            }
        }
    }
}
