//! Fire classifier model: random forest, artifact persistence

pub mod artifact;
pub mod forest;
pub mod tree;

use std::path::PathBuf;

use crate::layout::LayoutMismatchError;

pub use artifact::{ModelArtifact, ModelSummary, TrainingMetadata, ARTIFACT_FORMAT_VERSION};
pub use forest::{ForestParams, MaxFeatures, RandomForest};
pub use tree::{DecisionTree, Node, TreeParams};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to access artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported artifact format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("Artifact checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Invalid training data: {0}")]
    InvalidTrainingData(String),
}
