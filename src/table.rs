//! Column-oriented tabular data model.
//!
//! A [`DataTable`] holds named, typed columns of equal length. It is the raw
//! input to the preprocessing layer: cells may be missing (`None`), and the
//! column type (`Float`, `Int`, `Text`) drives the numerical-vs-categorical
//! routing inside the column transformer.

use crate::preprocess::PreprocessError;

/// Typed storage for one column. A `None` cell is a missing value.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    Float(Vec<Option<f64>>),
    Int(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    /// Number of cells in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for `Float` and `Int` columns.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Float(_) | Column::Int(_))
    }

    /// View the column as `f64` values, `NaN` for missing cells.
    ///
    /// Returns `None` for text columns.
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Float(v) => Some(v.iter().map(|c| c.unwrap_or(f64::NAN)).collect()),
            Column::Int(v) => Some(
                v.iter()
                    .map(|c| c.map(|x| x as f64).unwrap_or(f64::NAN))
                    .collect(),
            ),
            Column::Text(_) => None,
        }
    }

    /// Keep only the cells at the given row indices.
    fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Float(v) => Column::Float(indices.iter().map(|&i| v[i]).collect()),
            Column::Int(v) => Column::Int(indices.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// An ordered set of named columns with a shared row count.
#[derive(Clone, Debug, Default)]
pub struct DataTable {
    columns: Vec<(String, Column)>,
}

impl DataTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Fails if its length disagrees with existing columns.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<(), PreprocessError> {
        if let Some((first_name, first)) = self.columns.first() {
            if first.len() != column.len() {
                return Err(PreprocessError::RaggedColumns {
                    expected: first.len(),
                    got: column.len(),
                    column: format!("{} (vs {})", name.into(), first_name),
                });
            }
        }
        self.columns.push((name.into(), column));
        Ok(())
    }

    /// Builder-style `push_column`.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<Self, PreprocessError> {
        self.push_column(name, column)?;
        Ok(self)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Iterate `(name, column)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(n, c)| (n.as_str(), c))
    }

    /// Remove a column by name; absence is not an error.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|(n, _)| n == name)?;
        Some(self.columns.remove(idx).1)
    }

    /// New table containing only the given rows, in the given order.
    pub fn take(&self, indices: &[usize]) -> DataTable {
        DataTable {
            columns: self
                .columns
                .iter()
                .map(|(n, c)| (n.clone(), c.take(indices)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> DataTable {
        DataTable::new()
            .with_column("size", Column::Float(vec![Some(120.0), None, Some(90.0)]))
            .unwrap()
            .with_column("beds", Column::Int(vec![Some(3), Some(2), None]))
            .unwrap()
            .with_column(
                "loc",
                Column::Text(vec![Some("a".into()), Some("b".into()), None]),
            )
            .unwrap()
    }

    #[test]
    fn test_shape_and_lookup() {
        let t = sample_table();
        assert_eq!(t.n_rows(), 3);
        assert_eq!(t.n_columns(), 3);
        assert!(t.column("size").is_some());
        assert!(t.column("nope").is_none());
    }

    #[test]
    fn test_ragged_column_rejected() {
        let mut t = sample_table();
        let result = t.push_column("bad", Column::Int(vec![Some(1)]));
        assert!(matches!(result, Err(PreprocessError::RaggedColumns { .. })));
    }

    #[test]
    fn test_as_f64_missing_becomes_nan() {
        let t = sample_table();
        let v = t.column("size").unwrap().as_f64().unwrap();
        assert_eq!(v[0], 120.0);
        assert!(v[1].is_nan());
        let ints = t.column("beds").unwrap().as_f64().unwrap();
        assert_eq!(ints[0], 3.0);
        assert!(ints[2].is_nan());
        assert!(t.column("loc").unwrap().as_f64().is_none());
    }

    #[test]
    fn test_take_preserves_order() {
        let t = sample_table();
        let sub = t.take(&[2, 0]);
        assert_eq!(sub.n_rows(), 2);
        let v = sub.column("size").unwrap().as_f64().unwrap();
        assert_eq!(v[0], 90.0);
        assert_eq!(v[1], 120.0);
    }

    #[test]
    fn test_drop_column_absent_ok() {
        let mut t = sample_table();
        assert!(t.drop_column("missing").is_none());
        assert!(t.drop_column("loc").is_some());
        assert_eq!(t.n_columns(), 2);
    }
}
