//! Trainer and model selector.
//!
//! [`Trainer::train`] holds out a seeded test split, fits each candidate
//! family on the training split (grid-searching the random forest with
//! k-fold cross-validation), evaluates every fitted pipeline on the untouched
//! test rows, and returns the pipeline with the greatest test R². On an exact
//! tie the earlier-registered candidate keeps the win; registration order
//! puts the simplest model first.

pub mod metrics;
pub mod split;

pub use metrics::{evaluate, mae, r2_score, rmse, Evaluation};
pub use split::{train_test_split, KFold};

use crate::model::{
    FittedEstimator, GradientBoostingRegressor, LinearRegression, ModelError,
    RandomForestRegressor,
};
use crate::pipeline::{PipelineError, PricePipeline};
use crate::preprocess::{ColumnTransformer, PreprocessError};
use crate::table::DataTable;
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use thiserror::Error;
use tracing::info;

/// Random-forest search space: (n_estimators, max_depth).
const FOREST_GRID: [(usize, Option<usize>); 4] =
    [(100, None), (100, Some(10)), (200, None), (200, Some(10))];

/// Errors raised during a training run. All fatal; there is no degraded mode.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("empty training data")]
    EmptyData,

    #[error("length mismatch: {rows} feature rows vs {targets} targets")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("training split has {rows} rows, fewer than the {folds} cross-validation folds")]
    InsufficientRows { rows: usize, folds: usize },

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// One candidate's held-out metrics.
#[derive(Clone, Debug)]
pub struct CandidateReport {
    pub name: String,
    pub evaluation: Evaluation,
}

/// Result of a full training run.
#[derive(Debug)]
pub struct TrainingOutcome {
    pub winner: String,
    pub pipeline: PricePipeline,
    pub reports: Vec<CandidateReport>,
}

/// Candidate comparison driver.
#[derive(Clone, Debug)]
pub struct Trainer {
    test_size: f64,
    seed: u64,
    cv_folds: usize,
}

impl Default for Trainer {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            cv_folds: 5,
        }
    }
}

impl Trainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_cv_folds(mut self, cv_folds: usize) -> Self {
        self.cv_folds = cv_folds;
        self
    }

    /// Fit and compare all candidates, returning the winner and every
    /// candidate's held-out evaluation.
    pub fn train(
        &self,
        features: &DataTable,
        target: &[f64],
        preprocessor: &ColumnTransformer,
    ) -> Result<TrainingOutcome, TrainError> {
        let n = features.n_rows();
        if n == 0 {
            return Err(TrainError::EmptyData);
        }
        if n != target.len() {
            return Err(TrainError::LengthMismatch {
                rows: n,
                targets: target.len(),
            });
        }

        let (train_idx, test_idx) = train_test_split(n, self.test_size, self.seed);
        if train_idx.len() < self.cv_folds {
            return Err(TrainError::InsufficientRows {
                rows: train_idx.len(),
                folds: self.cv_folds,
            });
        }

        let train_table = features.take(&train_idx);
        let train_target: Vec<f64> = train_idx.iter().map(|&i| target[i]).collect();
        let test_table = features.take(&test_idx);
        let test_target: Vec<f64> = test_idx.iter().map(|&i| target[i]).collect();
        info!(
            train_rows = train_table.n_rows(),
            test_rows = test_table.n_rows(),
            "split historical data"
        );

        let mut candidates: Vec<(&'static str, PricePipeline)> = Vec::with_capacity(3);

        let linear = fit_pipeline(preprocessor, &train_table, &train_target, |x, y| {
            Ok(FittedEstimator::Linear(LinearRegression::new().fit(x, y)?))
        })?;
        candidates.push(("Linear Regression", linear));

        let (n_trees, max_depth) = self.tune_forest(preprocessor, &train_table, &train_target)?;
        info!(n_trees, ?max_depth, "random forest grid search complete");
        let seed = self.seed;
        let forest = fit_pipeline(preprocessor, &train_table, &train_target, |x, y| {
            Ok(FittedEstimator::Forest(
                RandomForestRegressor::new(n_trees)
                    .with_max_depth(max_depth)
                    .with_seed(seed)
                    .fit(x, y)?,
            ))
        })?;
        candidates.push(("Random Forest", forest));

        let boosting = fit_pipeline(preprocessor, &train_table, &train_target, |x, y| {
            Ok(FittedEstimator::Boosting(
                GradientBoostingRegressor::new().fit(x, y)?,
            ))
        })?;
        candidates.push(("Gradient Boosting", boosting));

        let mut reports = Vec::with_capacity(candidates.len());
        for (name, pipeline) in &candidates {
            let preds = pipeline.predict(&test_table)?;
            let evaluation = evaluate(&test_target, &preds);
            info!(
                candidate = %name,
                rmse = evaluation.rmse,
                mae = evaluation.mae,
                r2 = evaluation.r2,
                "held-out evaluation"
            );
            reports.push(CandidateReport {
                name: name.to_string(),
                evaluation,
            });
        }

        // Strictly-greater comparison keeps the first-registered candidate
        // on an exact tie.
        let mut winner_idx = 0;
        for i in 1..reports.len() {
            if reports[i].evaluation.r2 > reports[winner_idx].evaluation.r2 {
                winner_idx = i;
            }
        }

        let (winner, pipeline) = candidates.remove(winner_idx);
        info!(winner, r2 = reports[winner_idx].evaluation.r2, "selected model");

        Ok(TrainingOutcome {
            winner: winner.to_string(),
            pipeline,
            reports,
        })
    }

    /// Exhaustive grid search over [`FOREST_GRID`], scored by mean R² across
    /// k contiguous folds of the training split. Ties keep the earlier grid
    /// entry.
    fn tune_forest(
        &self,
        preprocessor: &ColumnTransformer,
        train_table: &DataTable,
        train_target: &[f64],
    ) -> Result<(usize, Option<usize>), TrainError> {
        let indices: Vec<usize> = (0..train_table.n_rows()).collect();
        let kfold = KFold::new(self.cv_folds);

        let scores: Vec<f64> = FOREST_GRID
            .par_iter()
            .map(|&(n_trees, max_depth)| -> Result<f64, TrainError> {
                let mut total = 0.0;
                for (fold_train, fold_val) in kfold.split(&indices) {
                    let fit_table = train_table.take(&fold_train);
                    let fit_target: Vec<f64> =
                        fold_train.iter().map(|&i| train_target[i]).collect();

                    let pre = preprocessor.fit(&fit_table)?;
                    let x = pre.transform(&fit_table)?;
                    let forest = RandomForestRegressor::new(n_trees)
                        .with_max_depth(max_depth)
                        .with_seed(self.seed)
                        .fit(&x, &Array1::from_vec(fit_target))?;

                    let val_table = train_table.take(&fold_val);
                    let val_x = pre.transform(&val_table)?;
                    let preds = forest.predict(&val_x)?;
                    let truth: Vec<f64> = fold_val.iter().map(|&i| train_target[i]).collect();
                    total += r2_score(&truth, &preds.to_vec());
                }
                Ok(total / kfold.n_splits() as f64)
            })
            .collect::<Result<_, _>>()?;

        let mut best = 0;
        for i in 1..scores.len() {
            if scores[i] > scores[best] {
                best = i;
            }
        }
        Ok(FOREST_GRID[best])
    }
}

fn fit_pipeline<F>(
    preprocessor: &ColumnTransformer,
    table: &DataTable,
    target: &[f64],
    fit: F,
) -> Result<PricePipeline, TrainError>
where
    F: Fn(&Array2<f64>, &Array1<f64>) -> Result<FittedEstimator, ModelError>,
{
    let fitted = preprocessor.fit(table)?;
    let x = fitted.transform(table)?;
    let y = Array1::from_vec(target.to_vec());
    let estimator = fit(&x, &y)?;
    Ok(PricePipeline::new(fitted, estimator))
}
