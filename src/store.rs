//! Artifact persistence for fitted pipelines.
//!
//! One pipeline, one well-known file. Saves go through a temp file in the
//! destination directory followed by a rename, so a reader never observes a
//! half-written artifact. Loads distinguish a missing file from corrupt
//! bytes; both are fail-fast.

use crate::pipeline::PricePipeline;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Default artifact location relative to the working directory.
pub const DEFAULT_MODEL_PATH: &str = "models/house_price_model.bin";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("model artifact not found at {0}")]
    NotFound(PathBuf),

    #[error("model artifact at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: bincode::Error,
    },

    #[error("serializing model artifact: {0}")]
    Serialize(bincode::Error),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: io::Error,
    },
}

/// Filesystem-backed store for a single pipeline artifact.
#[derive(Clone, Debug)]
pub struct ModelStore {
    path: PathBuf,
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_PATH)
    }
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize and persist a pipeline, replacing any previous artifact.
    pub fn save(&self, pipeline: &PricePipeline) -> Result<(), StoreError> {
        let bytes = bincode::serialize(pipeline).map_err(StoreError::Serialize)?;

        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        // Temp file in the same directory so the rename stays on one
        // filesystem.
        let tmp = self.path.with_extension("bin.tmp");
        fs::write(&tmp, &bytes).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), bytes = bytes.len(), "saved model artifact");
        Ok(())
    }

    /// Read and deserialize the persisted pipeline.
    pub fn load(&self) -> Result<PricePipeline, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()));
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let pipeline = bincode::deserialize(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), "loaded model artifact");
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FittedEstimator, LinearRegression};
    use crate::preprocess::ColumnTransformer;
    use crate::table::{Column, DataTable};
    use ndarray::array;
    use tempfile::TempDir;

    fn sample_pipeline() -> (PricePipeline, DataTable) {
        let table = DataTable::new()
            .with_column("Size", Column::Float(vec![Some(1.0), Some(2.0), Some(3.0)]))
            .unwrap();
        let pre = ColumnTransformer::new().fit(&table).unwrap();
        let x = pre.transform(&table).unwrap();
        let est = LinearRegression::new()
            .fit(&x, &array![10.0, 20.0, 30.0])
            .unwrap();
        (PricePipeline::new(pre, FittedEstimator::Linear(est)), table)
    }

    #[test]
    fn test_roundtrip_preserves_predictions() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path().join("model.bin"));
        let (pipeline, table) = sample_pipeline();

        store.save(&pipeline).unwrap();
        let reloaded = store.load().unwrap();
        assert_eq!(
            pipeline.predict(&table).unwrap(),
            reloaded.predict(&table).unwrap()
        );
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path().join("nested/models/model.bin"));
        let (pipeline, _) = sample_pipeline();
        store.save(&pipeline).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = ModelStore::new(dir.path().join("absent.bin"));
        assert!(matches!(store.load(), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_corrupt_artifact_is_distinguished() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.bin");
        std::fs::write(&path, b"not a pipeline").unwrap();
        let store = ModelStore::new(path);
        assert!(matches!(store.load(), Err(StoreError::Corrupt { .. })));
    }
}
