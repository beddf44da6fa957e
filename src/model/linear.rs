//! Ordinary least squares linear regression.
//!
//! Solved via the normal equations with a tiny ridge term on the diagonal so
//! collinear inputs (e.g. a full set of one-hot indicator columns) keep the
//! system solvable. The perturbation is far below metric precision.

use crate::model::{check_training_pair, ModelError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Unfitted linear regressor.
#[derive(Clone, Debug)]
pub struct LinearRegression {
    ridge: f64,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self { ridge: 1e-8 }
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
    ) -> Result<FittedLinearRegression, ModelError> {
        check_training_pair(x, y)?;

        let (rows, cols) = x.dim();
        let p = cols + 1; // intercept first

        // Normal equations: (AᵀA + λI) β = Aᵀy, A = [1 | X].
        let mut ata = Array2::<f64>::zeros((p, p));
        let mut aty = vec![0.0; p];
        for r in 0..rows {
            let row = x.row(r);
            aty[0] += y[r];
            ata[[0, 0]] += 1.0;
            for i in 0..cols {
                let xi = row[i];
                aty[i + 1] += xi * y[r];
                ata[[0, i + 1]] += xi;
                ata[[i + 1, 0]] += xi;
                for j in i..cols {
                    ata[[i + 1, j + 1]] += xi * row[j];
                }
            }
        }
        // Mirror the upper triangle.
        for i in 1..p {
            for j in (i + 1)..p {
                ata[[j, i]] = ata[[i, j]];
            }
        }
        for i in 0..p {
            ata[[i, i]] += self.ridge;
        }

        let beta = solve(ata, aty)?;
        Ok(FittedLinearRegression {
            intercept: beta[0],
            weights: beta[1..].to_vec(),
        })
    }
}

/// Fitted linear regressor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedLinearRegression {
    intercept: f64,
    weights: Vec<f64>,
}

impl FittedLinearRegression {
    pub fn n_features_in(&self) -> usize {
        self.weights.len()
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if x.ncols() != self.weights.len() {
            return Err(ModelError::FeatureMismatch {
                expected: self.weights.len(),
                got: x.ncols(),
            });
        }
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                self.intercept
                    + row
                        .iter()
                        .zip(&self.weights)
                        .map(|(xi, wi)| xi * wi)
                        .sum::<f64>()
            })
            .collect())
    }
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Array2<f64>, mut b: Vec<f64>) -> Result<Vec<f64>, ModelError> {
    let n = b.len();
    for col in 0..n {
        // Pivot on the largest remaining magnitude in this column.
        let mut pivot = col;
        for row in (col + 1)..n {
            if a[[row, col]].abs() > a[[pivot, col]].abs() {
                pivot = row;
            }
        }
        if a[[pivot, col]].abs() < 1e-300 {
            return Err(ModelError::Singular);
        }
        if pivot != col {
            for k in 0..n {
                let tmp = a[[col, k]];
                a[[col, k]] = a[[pivot, k]];
                a[[pivot, k]] = tmp;
            }
            b.swap(col, pivot);
        }

        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for col in (0..n).rev() {
        let mut acc = b[col];
        for k in (col + 1)..n {
            acc -= a[[col, k]] * x[k];
        }
        x[col] = acc / a[[col, col]];
    }
    Ok(x)
}
