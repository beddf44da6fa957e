//! Regression estimators.
//!
//! Each estimator follows the unfitted-config / fitted-state split: the
//! config struct holds hyperparameters, `fit` consumes a feature matrix and
//! target vector and returns a serializable fitted struct that only predicts.
//! [`FittedEstimator`] unites the fitted variants so a whole pipeline can
//! round-trip through one artifact.

pub mod boosting;
pub mod forest;
pub mod linear;
pub mod tree;

pub use boosting::{FittedGradientBoosting, GradientBoostingRegressor};
pub use forest::{FittedRandomForest, RandomForestRegressor};
pub use linear::{FittedLinearRegression, LinearRegression};
pub use tree::{FittedRegressionTree, RegressionTree};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while fitting or applying an estimator.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("empty training data")]
    EmptyData,

    #[error("shape mismatch: {rows} feature rows vs {targets} targets")]
    ShapeMismatch { rows: usize, targets: usize },

    /// The normal-equation system could not be solved.
    #[error("singular design matrix")]
    Singular,

    /// A bagged ensemble needs at least one tree to average over.
    #[error("ensemble requires at least one tree")]
    NoTrees,

    #[error("feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },
}

/// A fitted estimator of any candidate family.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum FittedEstimator {
    Linear(FittedLinearRegression),
    Forest(FittedRandomForest),
    Boosting(FittedGradientBoosting),
}

impl FittedEstimator {
    /// Predict one target value per input row.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        match self {
            FittedEstimator::Linear(m) => m.predict(x),
            FittedEstimator::Forest(m) => m.predict(x),
            FittedEstimator::Boosting(m) => m.predict(x),
        }
    }

    /// Number of features the estimator was fitted on.
    pub fn n_features_in(&self) -> usize {
        match self {
            FittedEstimator::Linear(m) => m.n_features_in(),
            FittedEstimator::Forest(m) => m.n_features_in(),
            FittedEstimator::Boosting(m) => m.n_features_in(),
        }
    }
}

/// Validate an `(x, y)` training pair.
pub(crate) fn check_training_pair(x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
    if x.nrows() == 0 {
        return Err(ModelError::EmptyData);
    }
    if x.nrows() != y.len() {
        return Err(ModelError::ShapeMismatch {
            rows: x.nrows(),
            targets: y.len(),
        });
    }
    Ok(())
}
