//! Seeded train/holdout split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::TrainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with `seed`; the first `ceil(test_size * n)` indices form
/// the holdout, the rest the training set.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Result<SplitIndices, TrainError> {
    if n == 0 {
        return Err(TrainError::EmptyDataset);
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainError::InvalidSplit(test_size));
    }

    let n_test = (test_size * n as f64).ceil() as usize;
    if n_test >= n {
        return Err(TrainError::InvalidSplit(test_size));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(SplitIndices { train, test: indices })
}
