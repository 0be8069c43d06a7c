//! Liveness message

use axum::Json;
use serde_json::{json, Value};

pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Forest Fire Prediction API is Running!",
        "status": "success"
    }))
}
