//! Assessment catalog
//!
//! The catalog is loaded once at startup, validated, and then shared
//! read-only. Record indices follow load order and never change.

mod record;
pub mod seed;
mod topic;

pub use record::{AssessmentRecord, SupportFlag, TestTypes};
pub use topic::Topic;

use crate::MIN_CATALOG_SIZE;
use std::path::Path;
use thiserror::Error;

/// Errors raised while reading, validating or writing a catalog
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("insufficient assessments: {found} < {required} required")]
    TooFewRecords { found: usize, required: usize },

    #[error("invalid record at index {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("seed list is empty, cannot generate assessments")]
    EmptySeed,

    #[error("failed to write dataset {path}: {message}")]
    Write { path: String, message: String },
}

/// Validated, immutable set of assessment records
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<AssessmentRecord>,
}

impl Catalog {
    /// Load and validate a JSON catalog from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let records = seed::read_records(path.as_ref())?;
        let catalog = Self::from_records(records)?;

        tracing::info!(
            path = %path.as_ref().display(),
            records = catalog.len(),
            "Loaded assessment catalog"
        );

        Ok(catalog)
    }

    /// Validate records and assign indices in the given order
    pub fn from_records(mut records: Vec<AssessmentRecord>) -> Result<Self, DatasetError> {
        if records.len() < MIN_CATALOG_SIZE {
            return Err(DatasetError::TooFewRecords {
                found: records.len(),
                required: MIN_CATALOG_SIZE,
            });
        }

        for (index, record) in records.iter_mut().enumerate() {
            if record.test_type.is_empty() {
                return Err(DatasetError::InvalidRecord {
                    index,
                    reason: "test_type must contain at least one label".to_string(),
                });
            }
            record.index = index;
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[AssessmentRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&AssessmentRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssessmentRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
