//! Prediction service - validate → classify → map
//!
//! The classifier is injected, so the service can run against a trained
//! artifact, a stub in tests, or nothing at all (every prediction then fails
//! with `ModelUnavailable`).

use std::sync::Arc;

use serde_json::Value;

use crate::layout::{FeatureVector, FireWeather};
use crate::model::{ModelArtifact, ModelError, ModelSummary, RandomForest};
use crate::risk::RiskAssessment;
use crate::validation::{ValidationError, ValidationMode, Validator};

/// Opaque capability: feature vector → fire probability in [0, 1]
pub trait FireClassifier: Send + Sync {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

impl FireClassifier for RandomForest {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        RandomForest::predict_proba(self, features)
    }
}

impl FireClassifier for ModelArtifact {
    fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        ModelArtifact::predict_proba(self, features)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Model not loaded. Please train the model first.")]
    ModelUnavailable,

    #[error("Classifier failed: {0}")]
    Classifier(#[from] ModelError),

    #[error("Classifier returned probability {0} outside [0, 1]")]
    InvalidProbability(f64),
}

pub struct Predictor {
    classifier: Option<Arc<dyn FireClassifier>>,
    validator: Validator,
    summary: Option<ModelSummary>,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn FireClassifier>, validator: Validator) -> Self {
        Self {
            classifier: Some(classifier),
            validator,
            summary: None,
        }
    }

    /// Service without a model
    pub fn unloaded(validator: Validator) -> Self {
        Self {
            classifier: None,
            validator,
            summary: None,
        }
    }

    /// Service backed by a trained artifact; month/day labels resolve
    /// through the artifact's encoders
    pub fn from_artifact(artifact: ModelArtifact, mode: ValidationMode) -> Self {
        let summary = artifact.summary();
        let validator = Validator::new(mode).with_encoders(artifact.encoders.clone());
        Self {
            classifier: Some(Arc::new(artifact)),
            validator,
            summary: Some(summary),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn summary(&self) -> Option<&ModelSummary> {
        self.summary.as_ref()
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Full request path from a raw body
    pub fn predict_body(&self, body: &[u8]) -> Result<RiskAssessment, PredictError> {
        let classifier = self.classifier()?;
        let input = self.validator.validate_body(body)?;
        Self::assess(classifier, &input)
    }

    /// Full request path from a parsed payload
    pub fn predict_value(&self, payload: Option<&Value>) -> Result<RiskAssessment, PredictError> {
        let classifier = self.classifier()?;
        let input = self.validator.validate(payload)?;
        Self::assess(classifier, &input)
    }

    pub fn predict(&self, input: &FireWeather) -> Result<RiskAssessment, PredictError> {
        Self::assess(self.classifier()?, input)
    }

    fn classifier(&self) -> Result<&dyn FireClassifier, PredictError> {
        self.classifier.as_deref().ok_or(PredictError::ModelUnavailable)
    }

    fn assess(classifier: &dyn FireClassifier, input: &FireWeather) -> Result<RiskAssessment, PredictError> {
        let probability = classifier.predict_proba(&input.to_features())?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(PredictError::InvalidProbability(probability));
        }

        let assessment = RiskAssessment::from_probability(probability);
        log::debug!(
            "Prediction: p={:.4} level={} fire_risk={}",
            probability,
            assessment.risk_level,
            assessment.fire_risk
        );
        Ok(assessment)
    }
}
