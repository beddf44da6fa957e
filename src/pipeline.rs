//! A fitted preprocessing + estimator unit.
//!
//! [`PricePipeline`] pairs a frozen column transformer with a fitted
//! estimator. It is immutable once built and serde-derived so the whole unit,
//! frozen feature schema included, round-trips through a single artifact.

use crate::model::{FittedEstimator, ModelError};
use crate::preprocess::{FittedColumnTransformer, PreprocessError};
use crate::table::DataTable;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while applying a fitted pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("expected a single-row table, got {0} rows")]
    NotSingleRow(usize),
}

/// Fitted preprocessing and regression steps as one persistable unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PricePipeline {
    preprocessor: FittedColumnTransformer,
    estimator: FittedEstimator,
}

impl PricePipeline {
    pub fn new(preprocessor: FittedColumnTransformer, estimator: FittedEstimator) -> Self {
        Self {
            preprocessor,
            estimator,
        }
    }

    pub fn preprocessor(&self) -> &FittedColumnTransformer {
        &self.preprocessor
    }

    pub fn estimator(&self) -> &FittedEstimator {
        &self.estimator
    }

    /// Predict one price per table row.
    pub fn predict(&self, table: &DataTable) -> Result<Vec<f64>, PipelineError> {
        let x = self.preprocessor.transform(table)?;
        let y = self.estimator.predict(&x)?;
        Ok(y.to_vec())
    }

    /// Predict for a table holding exactly one row.
    pub fn predict_one(&self, table: &DataTable) -> Result<f64, PipelineError> {
        if table.n_rows() != 1 {
            return Err(PipelineError::NotSingleRow(table.n_rows()));
        }
        let mut preds = self.predict(table)?;
        Ok(preds.remove(0))
    }
}
