//! Column transformer routing heterogeneous features.
//!
//! At fit time the feature table's columns are classified by value type:
//! `Float`/`Int` columns are numerical, `Text` columns are categorical. That
//! classification is frozen into the fitted transformer and validated by name
//! on every transform call; it is never re-derived from inference input, so
//! train-time and serve-time routing can never drift apart.
//!
//! Numerical path: median imputation, then standard scaling.
//! Categorical path: most-frequent imputation, then one-hot encoding with
//! unseen categories mapped to all zeros.
//! Outputs are concatenated numerical-block-first, in fit-time column order.

use crate::preprocess::encode::{FittedOneHotEncoder, HandleUnknown, OneHotEncoder};
use crate::preprocess::error::PreprocessError;
use crate::preprocess::impute::{FittedSimpleImputer, ImputeStrategy, SimpleImputer};
use crate::preprocess::scale::{FittedStandardScaler, StandardScaler};
use crate::table::{Column, DataTable};
use ndarray::{concatenate, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Role assigned to a feature column when the transformer was fitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    Numerical,
    Categorical,
}

impl ColumnRole {
    fn of(column: &Column) -> ColumnRole {
        if column.is_numeric() {
            ColumnRole::Numerical
        } else {
            ColumnRole::Categorical
        }
    }

    fn name(self) -> &'static str {
        match self {
            ColumnRole::Numerical => "numerical",
            ColumnRole::Categorical => "categorical",
        }
    }
}

/// Unfitted column transformer.
#[derive(Clone, Debug, Default)]
pub struct ColumnTransformer {
    impute_strategy: ImputeStrategy,
    handle_unknown: HandleUnknown,
}

impl ColumnTransformer {
    /// Median imputation and ignore-unknown encoding, the defaults used by
    /// the training pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_impute_strategy(mut self, strategy: ImputeStrategy) -> Self {
        self.impute_strategy = strategy;
        self
    }

    pub fn with_handle_unknown(mut self, policy: HandleUnknown) -> Self {
        self.handle_unknown = policy;
        self
    }

    /// Classify columns, then fit both processing paths on the training data.
    pub fn fit(&self, table: &DataTable) -> Result<FittedColumnTransformer, PreprocessError> {
        if table.n_rows() == 0 {
            return Err(PreprocessError::EmptyData(
                "cannot fit ColumnTransformer on an empty table".to_string(),
            ));
        }

        let mut numerical = Vec::new();
        let mut categorical = Vec::new();
        for (name, column) in table.iter() {
            match ColumnRole::of(column) {
                ColumnRole::Numerical => numerical.push(name.to_string()),
                ColumnRole::Categorical => categorical.push(name.to_string()),
            }
        }

        let (imputer, scaler) = if numerical.is_empty() {
            (None, None)
        } else {
            let matrix = numeric_block(table, &numerical)?;
            let imputer = SimpleImputer::new(self.impute_strategy.clone()).fit(&matrix)?;
            let imputed = imputer.transform(&matrix)?;
            let scaler = StandardScaler::new().fit(&imputed)?;
            (Some(imputer), Some(scaler))
        };

        let encoder = if categorical.is_empty() {
            None
        } else {
            let cells = text_block(table, &categorical)?;
            Some(
                OneHotEncoder::new()
                    .with_handle_unknown(self.handle_unknown)
                    .fit(&cells)?,
            )
        };

        Ok(FittedColumnTransformer {
            numerical,
            categorical,
            imputer,
            scaler,
            encoder,
        })
    }
}

/// Fitted column transformer carrying the frozen column classification.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FittedColumnTransformer {
    numerical: Vec<String>,
    categorical: Vec<String>,
    imputer: Option<FittedSimpleImputer>,
    scaler: Option<FittedStandardScaler>,
    encoder: Option<FittedOneHotEncoder>,
}

impl FittedColumnTransformer {
    /// Column names and roles frozen at fit time, numerical block first.
    pub fn schema(&self) -> Vec<(&str, ColumnRole)> {
        self.numerical
            .iter()
            .map(|n| (n.as_str(), ColumnRole::Numerical))
            .chain(
                self.categorical
                    .iter()
                    .map(|n| (n.as_str(), ColumnRole::Categorical)),
            )
            .collect()
    }

    /// Width of the transformed feature matrix.
    pub fn n_features_out(&self) -> usize {
        self.numerical.len()
            + self
                .encoder
                .as_ref()
                .map(|e| e.n_features_out())
                .unwrap_or(0)
    }

    /// Map a feature table to the fixed-width numeric matrix.
    ///
    /// Columns are resolved by name against the frozen schema; missing
    /// columns and fit/transform type disagreements are errors.
    pub fn transform(&self, table: &DataTable) -> Result<Array2<f64>, PreprocessError> {
        self.check_schema(table)?;

        let rows = table.n_rows();
        let mut blocks: Vec<Array2<f64>> = Vec::with_capacity(2);

        if let (Some(imputer), Some(scaler)) = (&self.imputer, &self.scaler) {
            let matrix = numeric_block(table, &self.numerical)?;
            blocks.push(scaler.transform(&imputer.transform(&matrix)?)?);
        }

        if let Some(encoder) = &self.encoder {
            let cells = text_block(table, &self.categorical)?;
            blocks.push(encoder.transform(&cells)?);
        }

        match blocks.len() {
            0 => Ok(Array2::zeros((rows, 0))),
            1 => Ok(blocks.pop().unwrap_or_else(|| Array2::zeros((rows, 0)))),
            _ => {
                let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
                concatenate(Axis(1), &views).map_err(|_| PreprocessError::RaggedColumns {
                    expected: rows,
                    got: 0,
                    column: "transformed blocks".to_string(),
                })
            }
        }
    }

    fn check_schema(&self, table: &DataTable) -> Result<(), PreprocessError> {
        for (name, role) in self.schema() {
            let column = table
                .column(name)
                .ok_or_else(|| PreprocessError::MissingColumn(name.to_string()))?;
            let got = ColumnRole::of(column);
            if got != role {
                return Err(PreprocessError::ColumnTypeMismatch {
                    column: name.to_string(),
                    expected: role.name(),
                    got: got.name(),
                });
            }
        }
        Ok(())
    }
}

/// Gather the named numeric columns into a row-major matrix, NaN for missing.
fn numeric_block(table: &DataTable, names: &[String]) -> Result<Array2<f64>, PreprocessError> {
    let rows = table.n_rows();
    let mut cols: Vec<Vec<f64>> = Vec::with_capacity(names.len());
    for name in names {
        let column = table
            .column(name)
            .ok_or_else(|| PreprocessError::MissingColumn(name.clone()))?;
        let values = column
            .as_f64()
            .ok_or_else(|| PreprocessError::ColumnTypeMismatch {
                column: name.clone(),
                expected: "numerical",
                got: "categorical",
            })?;
        cols.push(values);
    }
    Ok(Array2::from_shape_fn((rows, names.len()), |(r, c)| {
        cols[c][r]
    }))
}

/// Gather the named text columns as optional cells.
fn text_block(
    table: &DataTable,
    names: &[String],
) -> Result<Vec<Vec<Option<String>>>, PreprocessError> {
    names
        .iter()
        .map(|name| {
            match table
                .column(name)
                .ok_or_else(|| PreprocessError::MissingColumn(name.clone()))?
            {
                Column::Text(cells) => Ok(cells.clone()),
                _ => Err(PreprocessError::ColumnTypeMismatch {
                    column: name.clone(),
                    expected: "categorical",
                    got: "numerical",
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_table() -> DataTable {
        DataTable::new()
            .with_column(
                "size",
                Column::Float(vec![Some(100.0), Some(200.0), None, Some(150.0)]),
            )
            .unwrap()
            .with_column("beds", Column::Int(vec![Some(2), Some(4), Some(3), None]))
            .unwrap()
            .with_column(
                "loc",
                Column::Text(vec![
                    Some("downtown".into()),
                    Some("suburb".into()),
                    None,
                    Some("downtown".into()),
                ]),
            )
            .unwrap()
    }

    #[test]
    fn test_fit_classifies_and_freezes_schema() {
        let fitted = ColumnTransformer::new().fit(&mixed_table()).unwrap();
        let schema = fitted.schema();
        assert_eq!(schema[0], ("size", ColumnRole::Numerical));
        assert_eq!(schema[1], ("beds", ColumnRole::Numerical));
        assert_eq!(schema[2], ("loc", ColumnRole::Categorical));
        // 2 numeric + 2 one-hot categories
        assert_eq!(fitted.n_features_out(), 4);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let table = mixed_table();
        let fitted = ColumnTransformer::new().fit(&table).unwrap();
        let a = fitted.transform(&table).unwrap();
        let b = fitted.transform(&table).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dim(), (4, 4));
        assert!(a.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_transform_by_name_ignores_column_order() {
        let table = mixed_table();
        let fitted = ColumnTransformer::new().fit(&table).unwrap();

        let reordered = DataTable::new()
            .with_column("loc", table.column("loc").unwrap().clone())
            .unwrap()
            .with_column("beds", table.column("beds").unwrap().clone())
            .unwrap()
            .with_column("size", table.column("size").unwrap().clone())
            .unwrap();

        assert_eq!(
            fitted.transform(&table).unwrap(),
            fitted.transform(&reordered).unwrap()
        );
    }

    #[test]
    fn test_missing_column_rejected() {
        let table = mixed_table();
        let fitted = ColumnTransformer::new().fit(&table).unwrap();
        let mut incomplete = table.clone();
        incomplete.drop_column("beds");
        assert!(matches!(
            fitted.transform(&incomplete),
            Err(PreprocessError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_type_change_rejected() {
        let table = mixed_table();
        let fitted = ColumnTransformer::new().fit(&table).unwrap();
        let mut changed = table.clone();
        changed.drop_column("beds");
        changed
            .push_column(
                "beds",
                Column::Text(vec![Some("2".into()), Some("4".into()), None, None]),
            )
            .unwrap();
        assert!(matches!(
            fitted.transform(&changed),
            Err(PreprocessError::ColumnTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_unseen_category_zero_block() {
        let table = mixed_table();
        let fitted = ColumnTransformer::new().fit(&table).unwrap();

        let probe = DataTable::new()
            .with_column("size", Column::Float(vec![Some(100.0)]))
            .unwrap()
            .with_column("beds", Column::Int(vec![Some(2)]))
            .unwrap()
            .with_column("loc", Column::Text(vec![Some("rural".into())]))
            .unwrap();

        let out = fitted.transform(&probe).unwrap();
        // Categorical block (last 2 columns) is all zeros.
        assert_eq!(out[[0, 2]], 0.0);
        assert_eq!(out[[0, 3]], 0.0);
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(ColumnTransformer::new().fit(&DataTable::new()).is_err());
    }

    #[test]
    fn test_all_numeric_table() {
        let table = DataTable::new()
            .with_column("a", Column::Float(vec![Some(1.0), Some(2.0)]))
            .unwrap();
        let fitted = ColumnTransformer::new().fit(&table).unwrap();
        assert_eq!(fitted.n_features_out(), 1);
        assert_eq!(fitted.transform(&table).unwrap().dim(), (2, 1));
    }
}
