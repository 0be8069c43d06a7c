//! Model artifact - the single file shared by trainer and prediction service
//!
//! The artifact carries everything inference needs besides the forest: the
//! feature layout it was trained on and the month/day label encodings.
//! A SHA-256 of the serialized forest guards against truncated or edited
//! files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::forest::{ForestParams, RandomForest};
use super::ModelError;
use crate::encoder::CategoryEncoders;
use crate::layout::{FeatureVector, LayoutInfo};

/// Bump when the artifact structure changes incompatibly
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Provenance of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    pub trained_at: DateTime<Utc>,
    /// Dataset path or label as given to the trainer
    pub dataset: String,
    pub training_rows: usize,
    pub holdout_rows: usize,
    /// Fraction of training rows labelled as fire
    pub positive_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub layout: LayoutInfo,
    pub encoders: CategoryEncoders,
    pub metadata: TrainingMetadata,
    /// Hex SHA-256 of the serialized forest
    pub checksum: String,
    pub forest: RandomForest,
}

/// Artifact description without the trees, served by the model info endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub format_version: u32,
    pub layout: LayoutInfo,
    pub encoders: CategoryEncoders,
    pub metadata: TrainingMetadata,
    pub params: ForestParams,
    pub n_trees: usize,
    pub checksum: String,
}

impl ModelArtifact {
    pub fn new(
        forest: RandomForest,
        encoders: CategoryEncoders,
        metadata: TrainingMetadata,
    ) -> Result<Self, ModelError> {
        let checksum = forest_checksum(&forest)?;
        Ok(Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            layout: LayoutInfo::current(),
            encoders,
            metadata,
            checksum,
            forest,
        })
    }

    /// Load and verify an artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        log::info!("Loading model artifact from: {}", path.display());

        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let artifact = Self::from_slice(&bytes)?;

        log::info!(
            "Model artifact loaded: {} trees, trained {}",
            artifact.forest.n_trees(),
            artifact.metadata.trained_at
        );

        Ok(artifact)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ModelError> {
        let artifact: Self = serde_json::from_slice(bytes)?;
        artifact.verify()?;
        Ok(artifact)
    }

    /// Write the artifact, replacing any previous file in one rename
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let io_err = |source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let bytes = serde_json::to_vec_pretty(self)?;
        let tmp_path = temp_path(path);

        let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(&bytes).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        fs::rename(&tmp_path, path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            io_err(source)
        })?;

        log::info!("Model artifact written to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Format, layout, checksum and structural checks
    pub fn verify(&self) -> Result<(), ModelError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedFormat {
                found: self.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }

        self.layout.validate()?;

        let actual = forest_checksum(&self.forest)?;
        if actual != self.checksum {
            return Err(ModelError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual,
            });
        }

        self.forest.validate()
    }

    pub fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        self.forest.predict_proba(features)
    }

    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            format_version: self.format_version,
            layout: self.layout.clone(),
            encoders: self.encoders.clone(),
            metadata: self.metadata.clone(),
            params: *self.forest.params(),
            n_trees: self.forest.n_trees(),
            checksum: self.checksum.clone(),
        }
    }
}

fn forest_checksum(forest: &RandomForest) -> Result<String, ModelError> {
    let bytes = serde_json::to_vec(forest)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "model".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::CategoryEncoder;
    use crate::layout::FEATURE_COUNT;

    fn tiny_artifact() -> ModelArtifact {
        let rows: Vec<_> = (0..12)
            .map(|i| {
                let mut values = [0.0; FEATURE_COUNT];
                values[0] = i as f64 * 1.1;
                FeatureVector::new(values)
            })
            .collect();
        let labels: Vec<_> = (0..12).map(|i| i > 5).collect();
        let params = ForestParams {
            n_trees: 3,
            ..ForestParams::default()
        };
        let forest = RandomForest::fit(&rows, &labels, params).unwrap();
        let encoders = CategoryEncoders {
            month: CategoryEncoder::fit(["aug", "sep"]),
            day: CategoryEncoder::fit(["mon"]),
        };
        let metadata = TrainingMetadata {
            trained_at: Utc::now(),
            dataset: "inline".to_string(),
            training_rows: 12,
            holdout_rows: 0,
            positive_rate: 0.5,
        };
        ModelArtifact::new(forest, encoders, metadata).unwrap()
    }

    #[test]
    fn test_new_artifact_verifies() {
        let artifact = tiny_artifact();
        assert_eq!(artifact.format_version, ARTIFACT_FORMAT_VERSION);
        assert_eq!(artifact.checksum.len(), 64);
        assert!(artifact.verify().is_ok());
    }

    #[test]
    fn test_tampered_forest_detected() {
        let artifact = tiny_artifact();
        let mut json = serde_json::to_value(&artifact).unwrap();
        json["forest"]["params"]["seed"] = serde_json::json!(1);
        let bytes = serde_json::to_vec(&json).unwrap();

        let err = ModelArtifact::from_slice(&bytes).unwrap_err();
        assert!(matches!(err, ModelError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_format_and_layout_checked() {
        let mut artifact = tiny_artifact();
        artifact.format_version = 99;
        assert!(matches!(artifact.verify(), Err(ModelError::UnsupportedFormat { found: 99, .. })));

        let mut artifact = tiny_artifact();
        artifact.layout.version += 1;
        assert!(matches!(artifact.verify(), Err(ModelError::LayoutMismatch(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelArtifact::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
    }

    #[test]
    fn test_save_replaces_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");
        let artifact = tiny_artifact();

        artifact.save(&path).unwrap();
        artifact.save(&path).unwrap();

        assert!(path.exists());
        assert!(!temp_path(&path).exists());
        assert_eq!(ModelArtifact::load(&path).unwrap(), artifact);
    }

    #[test]
    fn test_summary_omits_trees() {
        let artifact = tiny_artifact();
        let summary = serde_json::to_value(artifact.summary()).unwrap();
        assert_eq!(summary["n_trees"], 3);
        assert!(summary.get("forest").is_none());
        assert_eq!(summary["encoders"]["month"]["labels"][1], "sep");
    }
}
