//! Record engineering: raw sale records to a trainable feature table.
//!
//! Order of operations mirrors the training contract: drop the identifier,
//! drop rows with a missing target, derive `sold_year`/`sold_month` from the
//! sale date (unparseable dates become missing values, never row failures),
//! then split features from the target.

use crate::preprocess::error::PreprocessError;
use crate::table::{Column, DataTable};
use chrono::{Datelike, NaiveDate};

/// Target column; rows without it are excluded, never imputed.
pub const TARGET_COLUMN: &str = "Price";
/// Non-informative identifier, dropped if present.
pub const ID_COLUMN: &str = "Property ID";
/// Raw sale-date column, replaced by `sold_year`/`sold_month`.
pub const DATE_COLUMN: &str = "Date Sold";

/// Derived column names.
pub const SOLD_YEAR: &str = "sold_year";
pub const SOLD_MONTH: &str = "sold_month";

/// Accepted date layouts, tried in order.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a raw date cell into `(year, month)`. Total: unparseable input
/// yields `None` rather than an error.
pub fn parse_sale_date(raw: &str) -> Option<(i64, i64)> {
    let trimmed = raw.trim();
    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(trimmed, fmt)
            .ok()
            .map(|d| (i64::from(d.year()), i64::from(d.month())))
    })
}

/// Turn raw sale records into a feature table and aligned target vector.
pub fn prepare(mut table: DataTable) -> Result<(DataTable, Vec<f64>), PreprocessError> {
    table.drop_column(ID_COLUMN);

    let target_cells = target_values(&table)?;

    // Rows with a present target survive; everything else is excluded.
    let survivors: Vec<usize> = target_cells
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();
    if survivors.is_empty() {
        return Err(PreprocessError::NoTrainableRows {
            target: TARGET_COLUMN.to_string(),
        });
    }

    let mut table = table.take(&survivors);
    let target: Vec<f64> = survivors
        .iter()
        .filter_map(|&i| target_cells[i])
        .collect();

    engineer_sale_date(&mut table)?;
    table.drop_column(TARGET_COLUMN);

    Ok((table, target))
}

/// Read the target column as optional values; `Some(NaN)` counts as missing.
fn target_values(table: &DataTable) -> Result<Vec<Option<f64>>, PreprocessError> {
    let column = table
        .column(TARGET_COLUMN)
        .ok_or_else(|| PreprocessError::MissingColumn(TARGET_COLUMN.to_string()))?;
    match column {
        Column::Float(v) => Ok(v
            .iter()
            .map(|c| c.filter(|x| !x.is_nan()))
            .collect()),
        Column::Int(v) => Ok(v.iter().map(|c| c.map(|x| x as f64)).collect()),
        Column::Text(_) => Err(PreprocessError::ColumnTypeMismatch {
            column: TARGET_COLUMN.to_string(),
            expected: "numerical",
            got: "categorical",
        }),
    }
}

/// Replace the raw date column with derived year/month integer columns.
///
/// A missing or non-text date column is tolerated: records arriving at
/// serve time already carry `sold_year`/`sold_month`.
fn engineer_sale_date(table: &mut DataTable) -> Result<(), PreprocessError> {
    let cells = match table.column(DATE_COLUMN) {
        Some(Column::Text(cells)) => cells.clone(),
        _ => return Ok(()),
    };

    let parsed: Vec<Option<(i64, i64)>> = cells
        .iter()
        .map(|c| c.as_deref().and_then(parse_sale_date))
        .collect();

    table.drop_column(DATE_COLUMN);
    table.push_column(
        SOLD_YEAR,
        Column::Int(parsed.iter().map(|p| p.map(|(y, _)| y)).collect()),
    )?;
    table.push_column(
        SOLD_MONTH,
        Column::Int(parsed.iter().map(|p| p.map(|(_, m)| m)).collect()),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_table() -> DataTable {
        DataTable::new()
            .with_column(
                ID_COLUMN,
                Column::Int(vec![Some(1), Some(2), Some(3)]),
            )
            .unwrap()
            .with_column(
                "Size",
                Column::Float(vec![Some(100.0), Some(200.0), Some(300.0)]),
            )
            .unwrap()
            .with_column(
                DATE_COLUMN,
                Column::Text(vec![
                    Some("2023-06-15".into()),
                    Some("not a date".into()),
                    None,
                ]),
            )
            .unwrap()
            .with_column(
                TARGET_COLUMN,
                Column::Float(vec![Some(250_000.0), None, Some(410_000.0)]),
            )
            .unwrap()
    }

    #[test]
    fn test_missing_target_rows_excluded() {
        let (features, target) = prepare(raw_table()).unwrap();
        assert_eq!(features.n_rows(), 2);
        assert_eq!(target, vec![250_000.0, 410_000.0]);
        assert!(features.column(TARGET_COLUMN).is_none());
        assert!(features.column(ID_COLUMN).is_none());
    }

    #[test]
    fn test_date_engineering_total() {
        let (features, _) = prepare(raw_table()).unwrap();
        assert!(features.column(DATE_COLUMN).is_none());
        match features.column(SOLD_YEAR) {
            Some(Column::Int(v)) => {
                assert_eq!(v[0], Some(2023));
                // Second surviving row had an unparseable date.
                assert_eq!(v[1], None);
            }
            other => panic!("expected sold_year Int column, got {other:?}"),
        }
        match features.column(SOLD_MONTH) {
            Some(Column::Int(v)) => assert_eq!(v[0], Some(6)),
            other => panic!("expected sold_month Int column, got {other:?}"),
        }
    }

    #[test]
    fn test_all_targets_missing_is_error() {
        let table = DataTable::new()
            .with_column("Size", Column::Float(vec![Some(1.0)]))
            .unwrap()
            .with_column(TARGET_COLUMN, Column::Float(vec![None]))
            .unwrap();
        assert!(matches!(
            prepare(table),
            Err(PreprocessError::NoTrainableRows { .. })
        ));
    }

    #[test]
    fn test_absent_id_and_date_tolerated() {
        let table = DataTable::new()
            .with_column("Size", Column::Float(vec![Some(1.0)]))
            .unwrap()
            .with_column(TARGET_COLUMN, Column::Float(vec![Some(2.0)]))
            .unwrap();
        let (features, target) = prepare(table).unwrap();
        assert_eq!(features.n_columns(), 1);
        assert_eq!(target, vec![2.0]);
    }

    #[test]
    fn test_parse_sale_date_formats() {
        assert_eq!(parse_sale_date("2021-03-09"), Some((2021, 3)));
        assert_eq!(parse_sale_date("03/09/2021"), Some((2021, 3)));
        assert_eq!(parse_sale_date(" 2021-03-09 "), Some((2021, 3)));
        assert_eq!(parse_sale_date("March 9th"), None);
        assert_eq!(parse_sale_date(""), None);
    }
}
