//! Feature preprocessing for house-sale records.
//!
//! The pipeline mirrors the training contract in two stages:
//!
//! 1. [`prepare`] turns raw sale records into a feature table plus an
//!    aligned target vector (identifier dropped, missing-target rows
//!    excluded, sale date engineered into `sold_year`/`sold_month`).
//! 2. [`ColumnTransformer`] maps that feature table to a fixed-width numeric
//!    matrix: median imputation and standard scaling for numerical columns,
//!    most-frequent imputation and one-hot encoding for categorical columns.
//!
//! The column classification is computed once at fit time and frozen into
//! [`FittedColumnTransformer`], which serializes as part of the model
//! artifact so the serving path can never re-derive a different schema.

pub mod column_transformer;
pub mod encode;
pub mod error;
pub mod impute;
pub mod prepare;
pub mod scale;

pub use column_transformer::{ColumnRole, ColumnTransformer, FittedColumnTransformer};
pub use encode::{FittedOneHotEncoder, HandleUnknown, OneHotEncoder};
pub use error::PreprocessError;
pub use impute::{FittedSimpleImputer, ImputeStrategy, SimpleImputer};
pub use prepare::{parse_sale_date, prepare, DATE_COLUMN, ID_COLUMN, SOLD_MONTH, SOLD_YEAR, TARGET_COLUMN};
pub use scale::{FittedStandardScaler, StandardScaler};
