//! CSV ingestion.
//!
//! Reads a headered CSV into a [`DataTable`], inferring one type per column:
//! all values integral → `Int`, all numeric → `Float`, otherwise `Text`.
//! Empty cells are missing in every case.

use crate::table::{Column, DataTable};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("reading csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv has no header row")]
    NoHeader,

    #[error(transparent)]
    Table(#[from] crate::preprocess::PreprocessError),
}

/// Load a CSV file into a typed table.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataTable, DatasetError> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(DatasetError::NoHeader);
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (i, cell) in cells.iter_mut().enumerate() {
            let value = record.get(i).unwrap_or("").trim();
            cell.push((!value.is_empty()).then(|| value.to_string()));
        }
    }

    let mut table = DataTable::new();
    for (name, raw) in headers.into_iter().zip(cells) {
        table.push_column(name, infer_column(raw))?;
    }
    Ok(table)
}

/// Pick the narrowest type every present value fits.
fn infer_column(raw: Vec<Option<String>>) -> Column {
    let present = || raw.iter().flatten();

    if present().count() > 0 && present().all(|v| v.parse::<i64>().is_ok()) {
        return Column::Int(
            raw.iter()
                .map(|v| v.as_ref().and_then(|s| s.parse().ok()))
                .collect(),
        );
    }
    if present().count() > 0 && present().all(|v| v.parse::<f64>().is_ok()) {
        return Column::Float(
            raw.iter()
                .map(|v| v.as_ref().and_then(|s| s.parse().ok()))
                .collect(),
        );
    }
    Column::Text(raw)
}
