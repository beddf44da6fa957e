//! CART regression tree.
//!
//! Greedy binary splits chosen by sum-of-squared-error reduction, with an
//! optional depth cap. The tree is the shared building block for the bagged
//! and boosted ensembles; it is not a selection candidate on its own.

use crate::model::{check_training_pair, ModelError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Unfitted regression tree.
#[derive(Clone, Debug)]
pub struct RegressionTree {
    max_depth: Option<usize>,
    min_samples_split: usize,
}

impl Default for RegressionTree {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

impl RegressionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap tree depth; `None` grows until leaves are pure.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<FittedRegressionTree, ModelError> {
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.fit_on(x, y, &indices)
    }

    /// Fit on a row subset; duplicates are allowed (bootstrap samples).
    pub fn fit_on(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
    ) -> Result<FittedRegressionTree, ModelError> {
        check_training_pair(x, y)?;
        if indices.is_empty() {
            return Err(ModelError::EmptyData);
        }

        let root = self.build(x, y, indices, 0);
        Ok(FittedRegressionTree {
            root,
            n_features: x.ncols(),
        })
    }

    fn build(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize], depth: usize) -> Node {
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;

        let depth_reached = self.max_depth.is_some_and(|d| depth >= d);
        if depth_reached || indices.len() < self.min_samples_split {
            return Node::Leaf { value: mean };
        }

        let sse = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum::<f64>();
        if sse <= f64::EPSILON {
            return Node::Leaf { value: mean };
        }

        match best_split(x, y, indices) {
            Some(split) => {
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .partition(|&&i| x[[i, split.feature]] <= split.threshold);
                Node::Split {
                    feature: split.feature,
                    threshold: split.threshold,
                    left: Box::new(self.build(x, y, &left_idx, depth + 1)),
                    right: Box::new(self.build(x, y, &right_idx, depth + 1)),
                }
            }
            None => Node::Leaf { value: mean },
        }
    }
}

struct Split {
    feature: usize,
    threshold: f64,
}

/// Exact greedy search: per feature, sort the node's samples and scan split
/// points between distinct values, minimizing total child SSE.
fn best_split(x: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> Option<Split> {
    let n = indices.len();
    let mut best: Option<(f64, Split)> = None;

    for feature in 0..x.ncols() {
        let mut pairs: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (x[[i, feature]], y[i]))
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let total_sum: f64 = pairs.iter().map(|(_, t)| t).sum();
        let total_sq: f64 = pairs.iter().map(|(_, t)| t * t).sum();

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for i in 0..(n - 1) {
            left_sum += pairs[i].1;
            left_sq += pairs[i].1 * pairs[i].1;

            // No split between equal feature values.
            if pairs[i].0 == pairs[i + 1].0 {
                continue;
            }

            let left_n = (i + 1) as f64;
            let right_n = (n - i - 1) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;

            let cost = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.as_ref().is_none_or(|(c, _)| cost < *c) {
                best = Some((
                    cost,
                    Split {
                        feature,
                        threshold: (pairs[i].0 + pairs[i + 1].0) / 2.0,
                    },
                ));
            }
        }
    }

    best.map(|(_, s)| s)
}

/// Tree node; boxed recursion keeps the structure serde-friendly.
#[derive(Clone, Debug, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Fitted regression tree.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedRegressionTree {
    root: Node,
    n_features: usize,
}

impl FittedRegressionTree {
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
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let mut node = &self.root;
                loop {
                    match node {
                        Node::Leaf { value } => break *value,
                        Node::Split {
                            feature,
                            threshold,
                            left,
                            right,
                        } => {
                            node = if row[*feature] <= *threshold { left } else { right };
                        }
                    }
                }
            })
            .collect())
    }
}
