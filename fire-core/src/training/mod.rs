//! Offline training: CSV → encoded dataset → split → forest → artifact

pub mod dataset;
pub mod pipeline;
pub mod split;

use std::path::PathBuf;

use crate::model::ModelError;

pub use dataset::{EncodedDataset, RawDataset, RawRow, TARGET_COLUMN};
pub use pipeline::{train, TrainingConfig, TrainingOutcome};
pub use split::{train_test_split, SplitIndices};

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("Failed to read dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid value {value:?} in column '{column}' at line {line}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
    },

    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Invalid test size {0}: must be in (0, 1) and leave at least one training row")]
    InvalidSplit(f64),

    #[error("Training rows contain a single class (all {0}); cannot fit a fire classifier")]
    SingleClass(&'static str),

    #[error(transparent)]
    Model(#[from] ModelError),
}
