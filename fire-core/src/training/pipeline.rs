//! One-shot training run
//!
//! label (area > 0) → encode month/day → 80/20 split → fit forest → artifact.
//! The holdout rows are set aside and not scored.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::dataset::RawDataset;
use super::split::train_test_split;
use super::TrainError;
use crate::model::{ForestParams, ModelArtifact, RandomForest, TrainingMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Holdout fraction
    pub test_size: f64,
    /// Seeds both the split and the forest
    pub seed: u64,
    pub forest: ForestParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let forest = ForestParams::default();
        Self {
            test_size: 0.2,
            seed: forest.seed,
            forest,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub training_rows: usize,
    pub holdout_rows: usize,
    pub positive_rows: usize,
}

pub fn train(dataset: &RawDataset, config: &TrainingConfig) -> Result<TrainingOutcome, TrainError> {
    if dataset.is_empty() {
        return Err(TrainError::EmptyDataset);
    }

    let encoded = dataset.encode();
    let split = train_test_split(encoded.rows.len(), config.test_size, config.seed)?;

    let rows: Vec<_> = split.train.iter().map(|&i| encoded.rows[i]).collect();
    let labels: Vec<_> = split.train.iter().map(|&i| encoded.labels[i]).collect();

    let positive_rows = labels.iter().filter(|&&fire| fire).count();
    if positive_rows == 0 {
        return Err(TrainError::SingleClass("no-fire"));
    }
    if positive_rows == labels.len() {
        return Err(TrainError::SingleClass("fire"));
    }

    log::info!(
        "Training on {} rows ({} fire / {} no-fire), {} held out",
        rows.len(),
        positive_rows,
        rows.len() - positive_rows,
        split.test.len()
    );

    let params = ForestParams {
        seed: config.seed,
        ..config.forest
    };
    let forest = RandomForest::fit(&rows, &labels, params)?;

    let metadata = TrainingMetadata {
        trained_at: Utc::now(),
        dataset: dataset.source.clone(),
        training_rows: rows.len(),
        holdout_rows: split.test.len(),
        positive_rate: positive_rows as f64 / rows.len() as f64,
    };

    let artifact = ModelArtifact::new(forest, encoded.encoders, metadata)?;

    Ok(TrainingOutcome {
        artifact,
        training_rows: rows.len(),
        holdout_rows: split.test.len(),
        positive_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::dataset::RawRow;
    use crate::layout::FEATURE_COUNT;

    fn dataset(areas: &[f64]) -> RawDataset {
        let rows = areas
            .iter()
            .enumerate()
            .map(|(i, &area)| {
                let mut features = [0.0; FEATURE_COUNT];
                features[4] = i as f64;
                RawRow {
                    features,
                    month: if i % 2 == 0 { "aug" } else { "sep" }.to_string(),
                    day: "mon".to_string(),
                    area,
                }
            })
            .collect();
        RawDataset {
            source: "inline".to_string(),
            rows,
        }
    }

    fn quick_config() -> TrainingConfig {
        TrainingConfig {
            forest: ForestParams {
                n_trees: 5,
                ..ForestParams::default()
            },
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_train_records_metadata() {
        let areas: Vec<f64> = (0..20).map(|i| if i >= 10 { 1.5 } else { 0.0 }).collect();
        let outcome = train(&dataset(&areas), &quick_config()).unwrap();

        assert_eq!(outcome.training_rows, 16);
        assert_eq!(outcome.holdout_rows, 4);
        let meta = &outcome.artifact.metadata;
        assert_eq!(meta.training_rows, 16);
        assert_eq!(meta.dataset, "inline");
        assert_eq!(outcome.artifact.encoders.month.labels(), &["aug", "sep"]);
        assert_eq!(outcome.artifact.forest.n_trees(), 5);
        assert!(outcome.artifact.verify().is_ok());
    }

    #[test]
    fn test_single_class_rejected() {
        let areas = vec![0.0; 10];
        assert!(matches!(
            train(&dataset(&areas), &quick_config()),
            Err(TrainError::SingleClass("no-fire"))
        ));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        assert!(matches!(train(&dataset(&[]), &quick_config()), Err(TrainError::EmptyDataset)));
    }
}
