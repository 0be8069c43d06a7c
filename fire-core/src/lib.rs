//! Forest Fire Risk - core library
//!
//! Shared by the training binary and the prediction server.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   model.json   ┌──────────────────────────────────────┐
//! │   trainer    │ ─────────────► │           predict-server             │
//! │              │   (artifact)   │                                      │
//! │ CSV → encode │                │ JSON → Validator → FireClassifier    │
//! │ → split → RF │                │      → RiskAssessment → JSON         │
//! └──────────────┘                └──────────────────────────────────────┘
//! ```
//!
//! - [`layout`]: the fixed feature order shared by both sides
//! - [`validation`]: request payload → [`FireWeather`]
//! - [`risk`]: probability → fire flag, score and level
//! - [`predictor`]: the injectable prediction service
//! - [`model`]: random forest and the persisted artifact
//! - [`training`]: dataset loading and the training run

pub mod encoder;
pub mod layout;
pub mod model;
pub mod predictor;
pub mod risk;
pub mod training;
pub mod validation;

pub use encoder::{CategoryEncoder, CategoryEncoders};
pub use layout::{FeatureVector, FireWeather, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT};
pub use model::{ModelArtifact, ModelError, ModelSummary, RandomForest};
pub use predictor::{FireClassifier, PredictError, Predictor};
pub use risk::{RiskAssessment, RiskLevel};
pub use training::TrainError;
pub use validation::{ValidationError, ValidationMode, Validator};
