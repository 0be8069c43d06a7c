//! CART decision tree (Gini impurity, binary labels)
//!
//! Nodes are stored in pre-order: a split's children always come after it,
//! which `validate` relies on to rule out cycles in a loaded artifact.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::ModelError;
use crate::layout::{FeatureVector, FEATURE_COUNT};

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Non-constant features examined per split
    pub max_features: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: FEATURE_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// `x[feature] <= threshold` goes left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Fraction of positive (fire) samples that reached this leaf
    Leaf { probability: f64, samples: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct SplitCandidate {
    impurity: f64,
    feature: usize,
    threshold: f64,
}

struct Grower<'a> {
    rows: &'a [FeatureVector],
    labels: &'a [bool],
    params: &'a TreeParams,
    rng: &'a mut StdRng,
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on the rows selected by `sample` (duplicates allowed)
    pub fn fit(
        rows: &[FeatureVector],
        labels: &[bool],
        sample: &mut [usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Result<Self, ModelError> {
        if rows.len() != labels.len() {
            return Err(ModelError::InvalidTrainingData(format!(
                "{} rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }
        if sample.is_empty() {
            return Err(ModelError::InvalidTrainingData("empty sample".to_string()));
        }
        if let Some(&bad) = sample.iter().find(|&&i| i >= rows.len()) {
            return Err(ModelError::InvalidTrainingData(format!("sample index {} out of range", bad)));
        }

        let mut grower = Grower {
            rows,
            labels,
            params,
            rng,
            nodes: Vec::new(),
        };
        grower.grow(sample, 0);

        Ok(Self { nodes: grower.nodes })
    }

    /// Positive-class probability for one vector
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { probability, .. }) => return Ok(*probability),
                Some(Node::Split { feature, threshold, left, right }) => {
                    let value = features
                        .get(*feature)
                        .ok_or_else(|| ModelError::InvalidModel(format!("feature index {} out of range", feature)))?;
                    index = if value <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(ModelError::InvalidModel(format!("node index {} out of range", index)));
                }
            }
        }
    }

    /// Structural checks for a tree read from disk
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::InvalidModel("tree has no nodes".to_string()));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split { feature, threshold, left, right } => {
                    if *feature >= FEATURE_COUNT {
                        return Err(ModelError::InvalidModel(format!(
                            "node {} splits on feature {} (only {} features)",
                            index, feature, FEATURE_COUNT
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(ModelError::InvalidModel(format!("node {} has a non-finite threshold", index)));
                    }
                    for child in [left, right] {
                        if *child <= index || *child >= self.nodes.len() {
                            return Err(ModelError::InvalidModel(format!(
                                "node {} has invalid child {}",
                                index, child
                            )));
                        }
                    }
                }
                Node::Leaf { probability, .. } => {
                    if !(0.0..=1.0).contains(probability) {
                        return Err(ModelError::InvalidModel(format!(
                            "leaf {} has probability {} outside [0, 1]",
                            index, probability
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl Grower<'_> {
    fn grow(&mut self, sample: &mut [usize], depth: usize) -> usize {
        let node_id = self.nodes.len();
        let n = sample.len();
        let positives = sample.iter().filter(|&&i| self.labels[i]).count();
        let leaf = Node::Leaf {
            probability: positives as f64 / n as f64,
            samples: n,
        };

        let depth_reached = self.params.max_depth.map_or(false, |max| depth >= max);
        let pure = positives == 0 || positives == n;
        if depth_reached || pure || n < self.params.min_samples_split {
            self.nodes.push(leaf);
            return node_id;
        }

        let Some(split) = self.best_split(sample, positives) else {
            self.nodes.push(leaf);
            return node_id;
        };

        // Placeholder until both children are known
        self.nodes.push(leaf);

        let rows = self.rows;
        let mid = partition(sample, |i| value_at(rows, i, split.feature) <= split.threshold);
        let (left_sample, right_sample) = sample.split_at_mut(mid);
        let left = self.grow(left_sample, depth + 1);
        let right = self.grow(right_sample, depth + 1);

        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    /// Examine features in random order until `max_features` non-constant
    /// ones have been scored; keep the lowest weighted Gini impurity.
    fn best_split(&mut self, sample: &[usize], positives: usize) -> Option<SplitCandidate> {
        let n = sample.len();
        let min_leaf = self.params.min_samples_leaf.max(1);

        let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
        features.shuffle(&mut *self.rng);

        let mut best: Option<SplitCandidate> = None;
        let mut scored = 0;
        let mut column: Vec<(f64, bool)> = Vec::with_capacity(n);

        for feature in features {
            if scored >= self.params.max_features.max(1) {
                break;
            }

            column.clear();
            column.extend(sample.iter().map(|&i| (value_at(self.rows, i, feature), self.labels[i])));
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            if column[0].0 == column[n - 1].0 {
                continue;
            }
            scored += 1;

            let mut left_positives = 0;
            for k in 1..n {
                if column[k - 1].1 {
                    left_positives += 1;
                }
                if k < min_leaf || n - k < min_leaf {
                    continue;
                }
                let (lower, upper) = (column[k - 1].0, column[k].0);
                if lower >= upper {
                    continue;
                }

                let impurity = (k as f64 * gini(left_positives, k)
                    + (n - k) as f64 * gini(positives - left_positives, n - k))
                    / n as f64;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    best = Some(SplitCandidate {
                        impurity,
                        feature,
                        threshold: midpoint(lower, upper),
                    });
                }
            }
        }

        best
    }
}

fn value_at(rows: &[FeatureVector], index: usize, feature: usize) -> f64 {
    rows[index].as_array()[feature]
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    2.0 * p * (1.0 - p)
}

/// Threshold strictly below `upper` and not below `lower`
fn midpoint(lower: f64, upper: f64) -> f64 {
    let mid = lower / 2.0 + upper / 2.0;
    if mid >= upper || !mid.is_finite() {
        lower
    } else {
        mid
    }
}

/// Move matching indices to the front; returns how many matched
fn partition(sample: &mut [usize], mut goes_left: impl FnMut(usize) -> bool) -> usize {
    let mut mid = 0;
    for k in 0..sample.len() {
        if goes_left(sample[k]) {
            sample.swap(k, mid);
            mid += 1;
        }
    }
    mid
}
