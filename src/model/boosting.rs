//! Gradient boosting with squared-error loss.
//!
//! Stagewise fitting of shallow regression trees to the current residuals,
//! starting from the target mean. Defaults match the reference configuration:
//! 100 stages, learning rate 0.1, depth-3 trees.

use crate::model::tree::{FittedRegressionTree, RegressionTree};
use crate::model::{check_training_pair, ModelError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Unfitted gradient boosting regressor.
#[derive(Clone, Debug)]
pub struct GradientBoostingRegressor {
    n_estimators: usize,
    learning_rate: f64,
    max_depth: usize,
}

impl Default for GradientBoostingRegressor {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
        }
    }
}

impl GradientBoostingRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<FittedGradientBoosting, ModelError> {
        check_training_pair(x, y)?;

        let baseline = y.sum() / y.len() as f64;
        let mut current = Array1::<f64>::from_elem(y.len(), baseline);
        let mut trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let residuals = y - &current;
            let tree = RegressionTree::new()
                .with_max_depth(Some(self.max_depth))
                .fit(x, &residuals)?;
            current = current + tree.predict(x)? * self.learning_rate;
            trees.push(tree);
        }

        Ok(FittedGradientBoosting {
            baseline,
            learning_rate: self.learning_rate,
            trees,
            n_features: x.ncols(),
        })
    }
}

/// Fitted gradient boosting ensemble.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedGradientBoosting {
    baseline: f64,
    learning_rate: f64,
    trees: Vec<FittedRegressionTree>,
    n_features: usize,
}

impl FittedGradientBoosting {
    pub fn n_stages(&self) -> usize {
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

        let mut acc = Array1::<f64>::from_elem(x.nrows(), self.baseline);
        for tree in &self.trees {
            acc = acc + tree.predict(x)? * self.learning_rate;
        }
        Ok(acc)
    }
}
