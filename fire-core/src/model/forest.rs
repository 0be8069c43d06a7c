//! Random forest - bagged CART trees
//!
//! Defaults mirror a stock random forest classifier: 100 trees, unlimited
//! depth, sqrt(n_features) candidates per split, bootstrap sampling.
//! Probability is the mean of per-tree leaf fractions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, TreeParams};
use super::ModelError;
use crate::layout::{FeatureVector, FEATURE_COUNT};

/// Default seed, shared with the train/holdout split
pub const DEFAULT_SEED: u64 = 42;

/// Number of candidate features per split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    Sqrt,
    All,
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(k) => (*k).min(n_features),
        };
        n.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: DEFAULT_SEED,
        }
    }
}

impl ForestParams {
    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split.max(2),
            min_samples_leaf: self.min_samples_leaf.max(1),
            max_features: self.max_features.resolve(FEATURE_COUNT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit on labelled rows; deterministic for a given `params.seed`
    pub fn fit(rows: &[FeatureVector], labels: &[bool], params: ForestParams) -> Result<Self, ModelError> {
        if rows.is_empty() {
            return Err(ModelError::InvalidTrainingData("no training rows".to_string()));
        }
        if rows.len() != labels.len() {
            return Err(ModelError::InvalidTrainingData(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if params.n_trees == 0 {
            return Err(ModelError::InvalidTrainingData("n_trees must be at least 1".to_string()));
        }

        let tree_params = params.tree_params();
        let n = rows.len();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            let mut tree_rng = StdRng::seed_from_u64(rng.gen());

            let mut sample: Vec<usize> = if params.bootstrap {
                (0..n).map(|_| tree_rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };

            trees.push(DecisionTree::fit(rows, labels, &mut sample, &tree_params, &mut tree_rng)?);
        }

        log::debug!("Fitted random forest: {} trees on {} rows", trees.len(), n);

        Ok(Self { params, trees })
    }

    /// Mean positive-class probability across trees
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidModel("forest has no trees".to_string()));
        }

        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.predict_proba(features)?;
        }

        Ok(sum / self.trees.len() as f64)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::InvalidModel("forest has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ModelError::InvalidModel(format!("tree {}: {}", i, e)))?;
        }
        Ok(())
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fire when temp (index 4) is high and RH (index 5) is low
    fn toy_data() -> (Vec<FeatureVector>, Vec<bool>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..60 {
            let temp = 5.0 + (i % 30) as f64;
            let rh = 20.0 + ((i * 7) % 60) as f64;
            let mut values = [0.0; FEATURE_COUNT];
            values[4] = temp;
            values[5] = rh;
            values[8] = (i % 12) as f64;
            rows.push(FeatureVector::new(values));
            labels.push(temp > 20.0 && rh < 50.0);
        }
        (rows, labels)
    }

    fn small_params() -> ForestParams {
        ForestParams {
            n_trees: 15,
            ..ForestParams::default()
        }
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::Sqrt.resolve(10), 3);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
        assert_eq!(MaxFeatures::All.resolve(10), 10);
        assert_eq!(MaxFeatures::Fixed(20).resolve(10), 10);
        assert_eq!(MaxFeatures::Fixed(0).resolve(10), 1);
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let (rows, labels) = toy_data();
        let forest = RandomForest::fit(&rows, &labels, small_params()).unwrap();

        assert_eq!(forest.n_trees(), 15);
        for row in &rows {
            let p = forest.predict_proba(row).unwrap();
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_learns_obvious_pattern() {
        let (rows, labels) = toy_data();
        let forest = RandomForest::fit(&rows, &labels, small_params()).unwrap();

        let mut hot_dry = [0.0; FEATURE_COUNT];
        hot_dry[4] = 33.0;
        hot_dry[5] = 22.0;
        let mut cold_wet = [0.0; FEATURE_COUNT];
        cold_wet[4] = 6.0;
        cold_wet[5] = 75.0;

        let high = forest.predict_proba(&FeatureVector::new(hot_dry)).unwrap();
        let low = forest.predict_proba(&FeatureVector::new(cold_wet)).unwrap();
        assert!(high > 0.5, "hot/dry p={high}");
        assert!(low < 0.5, "cold/wet p={low}");
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (rows, labels) = toy_data();
        let a = RandomForest::fit(&rows, &labels, small_params()).unwrap();
        let b = RandomForest::fit(&rows, &labels, small_params()).unwrap();
        assert_eq!(a, b);

        let other_seed = ForestParams {
            seed: 7,
            ..small_params()
        };
        let c = RandomForest::fit(&rows, &labels, other_seed).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let (rows, labels) = toy_data();
        assert!(RandomForest::fit(&[], &[], small_params()).is_err());
        assert!(RandomForest::fit(&rows, &labels[1..], small_params()).is_err());
        let no_trees = ForestParams {
            n_trees: 0,
            ..small_params()
        };
        assert!(RandomForest::fit(&rows, &labels, no_trees).is_err());
    }
}
