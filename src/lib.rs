//! # housecast
//!
//! House price prediction: an offline trainer that compares regression
//! candidates over historical sales and persists the best fitted pipeline,
//! plus an online service that loads that artifact and prices single houses.
//!
//! ## Core Design Principles
//!
//! - **Unfitted/Fitted Separation**: every transformer and estimator splits
//!   into a config struct and a serializable fitted struct, so inference-time
//!   state is exactly what gets persisted and nothing more.
//! - **Frozen Schema**: the column transformer learns which columns are
//!   numerical vs categorical at fit time and resolves inference input by
//!   name against that frozen schema; it never re-derives types from a
//!   request.
//! - **Deterministic Training**: every stochastic step (splits, bootstraps)
//!   runs off a seeded RNG, so a fixed seed reproduces the same winner and
//!   metrics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use housecast::preprocess::{prepare, ColumnTransformer};
//! use housecast::store::ModelStore;
//! use housecast::table::DataTable;
//! use housecast::train::Trainer;
//!
//! # fn run(raw: DataTable) -> anyhow::Result<()> {
//! let (features, target) = prepare(raw)?;
//! let outcome = Trainer::new().train(&features, &target, &ColumnTransformer::new())?;
//! ModelStore::default().save(&outcome.pipeline)?;
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod model;
pub mod pipeline;
pub mod preprocess;
pub mod serve;
pub mod store;
pub mod table;
pub mod train;

pub use pipeline::PricePipeline;
pub use serve::{PredictError, PredictRequest, Prediction, PredictionService};
pub use store::ModelStore;
pub use table::{Column, DataTable};
pub use train::{Trainer, TrainingOutcome};
