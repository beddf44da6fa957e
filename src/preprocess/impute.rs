//! Numeric imputation for completing missing values.
//!
//! NaN cells are treated as missing and replaced per column with a statistic
//! learned at fit time.

use crate::preprocess::error::PreprocessError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Strategy for filling missing numeric values.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum ImputeStrategy {
    Mean,
    /// Per-column median, the strategy used for the house-price features.
    #[default]
    Median,
    Constant(f64),
}

/// Unfitted numeric imputer.
#[derive(Clone, Debug, Default)]
pub struct SimpleImputer {
    strategy: ImputeStrategy,
}

impl SimpleImputer {
    pub fn new(strategy: ImputeStrategy) -> Self {
        Self { strategy }
    }

    /// Learn per-column fill statistics, ignoring NaN cells.
    pub fn fit(&self, data: &Array2<f64>) -> Result<FittedSimpleImputer, PreprocessError> {
        let (rows, cols) = data.dim();
        if rows == 0 {
            return Err(PreprocessError::EmptyData(
                "cannot fit SimpleImputer on empty data".to_string(),
            ));
        }

        let mut statistics = Vec::with_capacity(cols);
        for col in data.columns() {
            let mut present: Vec<f64> = col.iter().copied().filter(|v| !v.is_nan()).collect();
            let stat = if present.is_empty() {
                // All cells missing: fall back to zero so transform stays total.
                0.0
            } else {
                match self.strategy {
                    ImputeStrategy::Mean => present.iter().sum::<f64>() / present.len() as f64,
                    ImputeStrategy::Median => {
                        present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                        let n = present.len();
                        if n % 2 == 0 {
                            (present[n / 2 - 1] + present[n / 2]) / 2.0
                        } else {
                            present[n / 2]
                        }
                    }
                    ImputeStrategy::Constant(v) => v,
                }
            };
            statistics.push(stat);
        }

        Ok(FittedSimpleImputer {
            statistics,
            n_features: cols,
        })
    }
}

/// Fitted numeric imputer ready for inference.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedSimpleImputer {
    statistics: Vec<f64>,
    n_features: usize,
}

impl FittedSimpleImputer {
    /// Per-column fill values.
    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }

    pub fn n_features_in(&self) -> usize {
        self.n_features
    }

    /// Replace NaN cells with the fitted statistics.
    pub fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>, PreprocessError> {
        let (_, cols) = data.dim();
        if cols != self.n_features {
            return Err(PreprocessError::FeatureMismatch {
                expected: self.n_features,
                got: cols,
            });
        }

        let mut out = data.clone();
        for (j, mut col) in out.columns_mut().into_iter().enumerate() {
            for v in col.iter_mut() {
                if v.is_nan() {
                    *v = self.statistics[j];
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_median_ignores_nan() {
        let data = array![[1.0, f64::NAN], [3.0, 4.0], [5.0, 6.0]];
        let fitted = SimpleImputer::new(ImputeStrategy::Median).fit(&data).unwrap();
        // col 0: median of [1, 3, 5]; col 1: median of [4, 6]
        assert!((fitted.statistics()[0] - 3.0).abs() < 1e-12);
        assert!((fitted.statistics()[1] - 5.0).abs() < 1e-12);

        let out = fitted.transform(&data).unwrap();
        assert!((out[[0, 1]] - 5.0).abs() < 1e-12);
        assert!(out.iter().all(|v| !v.is_nan()));
    }

    #[test]
    fn test_mean_strategy() {
        let data = array![[2.0], [4.0], [f64::NAN]];
        let fitted = SimpleImputer::new(ImputeStrategy::Mean).fit(&data).unwrap();
        assert!((fitted.statistics()[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_missing_column_fills_zero() {
        let data = array![[f64::NAN], [f64::NAN]];
        let fitted = SimpleImputer::default().fit(&data).unwrap();
        let out = fitted.transform(&data).unwrap();
        assert_eq!(out[[0, 0]], 0.0);
    }

    #[test]
    fn test_empty_data_rejected() {
        let data = Array2::<f64>::zeros((0, 2));
        assert!(SimpleImputer::default().fit(&data).is_err());
    }

    #[test]
    fn test_feature_mismatch() {
        let data = array![[1.0, 2.0]];
        let fitted = SimpleImputer::default().fit(&data).unwrap();
        let wrong = array![[1.0, 2.0, 3.0]];
        assert!(matches!(
            fitted.transform(&wrong),
            Err(PreprocessError::FeatureMismatch { expected: 2, got: 3 })
        ));
    }
}
