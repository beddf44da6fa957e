//! Zero-mean, unit-variance scaling.

use crate::preprocess::error::PreprocessError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Unfitted standard scaler. Statistics are learned from training data only.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler;

impl StandardScaler {
    pub fn new() -> Self {
        Self
    }

    pub fn fit(&self, data: &Array2<f64>) -> Result<FittedStandardScaler, PreprocessError> {
        let (rows, cols) = data.dim();
        if rows == 0 {
            return Err(PreprocessError::EmptyData(
                "cannot fit StandardScaler on empty data".to_string(),
            ));
        }

        let mut means = Vec::with_capacity(cols);
        let mut scales = Vec::with_capacity(cols);
        for col in data.columns() {
            let mean = col.sum() / rows as f64;
            let var = col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / rows as f64;
            let std = var.sqrt();
            means.push(mean);
            // Constant columns pass through centered but unscaled.
            scales.push(if std > 0.0 { std } else { 1.0 });
        }

        Ok(FittedStandardScaler {
            means,
            scales,
            n_features: cols,
        })
    }
}

/// Fitted standard scaler.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedStandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
    n_features: usize,
}

impl FittedStandardScaler {
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn n_features_in(&self) -> usize {
        self.n_features
    }

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
                *v = (*v - self.means[j]) / self.scales[j];
            }
        }
        Ok(out)
    }
}
