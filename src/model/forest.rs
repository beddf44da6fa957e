//! Bagged ensemble of regression trees.
//!
//! Each tree is fitted on a bootstrap sample drawn from an RNG seeded by the
//! ensemble seed plus the tree index, so fitting is deterministic for a given
//! seed whether or not the trees are built in parallel.

use crate::model::tree::{FittedRegressionTree, RegressionTree};
use crate::model::{check_training_pair, ModelError};
use ndarray::{Array1, Array2};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Unfitted random forest regressor.
#[derive(Clone, Debug)]
pub struct RandomForestRegressor {
    n_estimators: usize,
    max_depth: Option<usize>,
    seed: u64,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            seed: 42,
        }
    }
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FittedRandomForest, ModelError> {
        check_training_pair(x, y)?;
        if self.n_estimators == 0 {
            return Err(ModelError::NoTrees);
        }
        let rows = x.nrows();

        let trees: Result<Vec<FittedRegressionTree>, ModelError> = (0..self.n_estimators)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(t as u64));
                let sample: Vec<usize> = (0..rows).map(|_| rng.gen_range(0..rows)).collect();
                RegressionTree::new()
                    .with_max_depth(self.max_depth)
                    .fit_on(x, y, &sample)
            })
            .collect();

        Ok(FittedRandomForest {
            trees: trees?,
            n_features: x.ncols(),
        })
    }
}

/// Fitted random forest; prediction is the mean over trees.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedRandomForest {
    trees: Vec<FittedRegressionTree>,
    n_features: usize,
}

impl FittedRandomForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features_in(&self) -> usize {
        self.n_features
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if x.ncols() != self.n_features {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features,
                got: x.ncols(),
            });
        }

        let mut acc = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            acc += &tree.predict(x)?;
        }
        Ok(acc / self.trees.len() as f64)
    }
}
