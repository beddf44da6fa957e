//! Regression evaluation metrics.

use serde::{Deserialize, Serialize};

/// Held-out evaluation of one fitted candidate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

/// Compute RMSE, MAE and R² for paired truth/prediction slices.
///
/// Both slices must be non-empty and of equal length; callers guarantee this
/// by construction (predictions come from the same rows as the truths).
pub fn evaluate(truth: &[f64], preds: &[f64]) -> Evaluation {
    Evaluation {
        rmse: rmse(truth, preds),
        mae: mae(truth, preds),
        r2: r2_score(truth, preds),
    }
}

pub fn rmse(truth: &[f64], preds: &[f64]) -> f64 {
    let mse: f64 = truth
        .iter()
        .zip(preds)
        .map(|(t, p)| (t - p) * (t - p))
        .sum::<f64>()
        / truth.len() as f64;
    mse.sqrt()
}

pub fn mae(truth: &[f64], preds: &[f64]) -> f64 {
    truth
        .iter()
        .zip(preds)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / truth.len() as f64
}

/// Coefficient of determination. A constant truth vector scores 1.0 when
/// matched exactly and 0.0 otherwise.
pub fn r2_score(truth: &[f64], preds: &[f64]) -> f64 {
    let mean = truth.iter().sum::<f64>() / truth.len() as f64;
    let ss_tot: f64 = truth.iter().map(|t| (t - mean) * (t - mean)).sum();
    let ss_res: f64 = truth
        .iter()
        .zip(preds)
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = [1.0, 2.0, 3.0];
        let eval = evaluate(&y, &y);
        assert_eq!(eval.rmse, 0.0);
        assert_eq!(eval.mae, 0.0);
        assert_eq!(eval.r2, 1.0);
    }

    #[test]
    fn test_known_values() {
        let truth = [3.0, -0.5, 2.0, 7.0];
        let preds = [2.5, 0.0, 2.0, 8.0];
        assert!((mae(&truth, &preds) - 0.5).abs() < 1e-12);
        assert!((rmse(&truth, &preds) - 0.6123724356957945).abs() < 1e-12);
        assert!((r2_score(&truth, &preds) - 0.9486081370449679).abs() < 1e-12);
    }

    #[test]
    fn test_mean_prediction_scores_zero_r2() {
        let truth = [1.0, 2.0, 3.0, 4.0];
        let preds = [2.5, 2.5, 2.5, 2.5];
        assert!(r2_score(&truth, &preds).abs() < 1e-12);
    }

    #[test]
    fn test_constant_truth() {
        let truth = [5.0, 5.0, 5.0];
        assert_eq!(r2_score(&truth, &truth), 1.0);
        assert_eq!(r2_score(&truth, &[5.0, 5.0, 6.0]), 0.0);
    }
}
