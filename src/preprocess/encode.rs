//! One-hot encoding for categorical (text) features.
//!
//! Missing cells are filled with the most frequent value seen at fit time,
//! then each column is expanded into one indicator column per category. The
//! default unknown-category policy maps values unseen at fit time to an
//! all-zero indicator block instead of failing.

use crate::preprocess::error::PreprocessError;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Policy for categories not seen during fitting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleUnknown {
    /// Encode unseen categories as all zeros.
    #[default]
    Ignore,
    /// Reject unseen categories.
    Error,
}

/// Unfitted one-hot encoder.
#[derive(Clone, Debug, Default)]
pub struct OneHotEncoder {
    handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handle_unknown(mut self, policy: HandleUnknown) -> Self {
        self.handle_unknown = policy;
        self
    }

    /// Learn per-column fill values and category vocabularies.
    ///
    /// `columns` holds one `Vec` of optional cells per categorical feature.
    pub fn fit(&self, columns: &[Vec<Option<String>>]) -> Result<FittedOneHotEncoder, PreprocessError> {
        if columns.iter().any(|c| c.is_empty()) {
            return Err(PreprocessError::EmptyData(
                "cannot fit OneHotEncoder on empty data".to_string(),
            ));
        }

        let mut fitted_columns = Vec::with_capacity(columns.len());
        for cells in columns {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for cell in cells.iter().flatten() {
                *counts.entry(cell.as_str()).or_insert(0) += 1;
            }

            // Most frequent value; name order breaks count ties deterministically.
            let fill = counts
                .iter()
                .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
                .map(|(name, _)| name.to_string())
                .unwrap_or_default();

            let mut categories: Vec<String> = counts.keys().map(|s| s.to_string()).collect();
            if counts.is_empty() {
                // Entirely missing column: a single empty-string category.
                categories.push(String::new());
            }
            categories.sort();

            fitted_columns.push(CategoryColumn { fill, categories });
        }

        Ok(FittedOneHotEncoder {
            columns: fitted_columns,
            handle_unknown: self.handle_unknown,
        })
    }
}

/// Learned state for a single categorical column.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct CategoryColumn {
    /// Most frequent value at fit time, used to fill missing cells.
    fill: String,
    /// Sorted category vocabulary.
    categories: Vec<String>,
}

/// Fitted one-hot encoder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    columns: Vec<CategoryColumn>,
    handle_unknown: HandleUnknown,
}

impl FittedOneHotEncoder {
    pub fn n_features_in(&self) -> usize {
        self.columns.len()
    }

    /// Total width of the encoded output.
    pub fn n_features_out(&self) -> usize {
        self.columns.iter().map(|c| c.categories.len()).sum()
    }

    /// Category vocabulary for column `idx`.
    pub fn categories(&self, idx: usize) -> &[String] {
        &self.columns[idx].categories
    }

    /// Encode the given columns into an indicator matrix.
    pub fn transform(
        &self,
        columns: &[Vec<Option<String>>],
    ) -> Result<Array2<f64>, PreprocessError> {
        if columns.len() != self.columns.len() {
            return Err(PreprocessError::FeatureMismatch {
                expected: self.columns.len(),
                got: columns.len(),
            });
        }

        let rows = columns.first().map(|c| c.len()).unwrap_or(0);
        let mut out = Array2::<f64>::zeros((rows, self.n_features_out()));

        let mut offset = 0;
        for (cells, spec) in columns.iter().zip(&self.columns) {
            for (row, cell) in cells.iter().enumerate() {
                let value = cell.as_deref().unwrap_or(spec.fill.as_str());
                match spec.categories.binary_search_by(|c| c.as_str().cmp(value)) {
                    Ok(idx) => out[[row, offset + idx]] = 1.0,
                    Err(_) => {
                        if self.handle_unknown == HandleUnknown::Error {
                            return Err(PreprocessError::ColumnTypeMismatch {
                                column: format!("unknown category '{value}'"),
                                expected: "fitted category",
                                got: "unseen value",
                            });
                        }
                        // Ignore: the block stays all zeros.
                    }
                }
            }
            offset += spec.categories.len();
        }

        Ok(out)
    }
}
