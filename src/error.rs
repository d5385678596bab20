//! Error types shared by the data and model layers.

use crate::data::Dataset;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Result alias for data-access operations.
pub type DataResult<T> = Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    /// The store could not be reached, or the dataset or one of its columns is missing.
    #[error("{dataset} data unavailable: {reason}")]
    DataUnavailable { dataset: Dataset, reason: String },
    #[error("Invalid range: {0}")]
    InvalidRange(String),
    /// A row could not be turned into a typed record.
    #[error("Malformed {dataset} record: {reason}")]
    MalformedRecord { dataset: Dataset, reason: String },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl DataError {
    pub fn unavailable(dataset: Dataset, reason: impl ToString) -> Self {
        DataError::DataUnavailable {
            dataset,
            reason: reason.to_string(),
        }
    }

    pub fn malformed(dataset: Dataset, reason: impl ToString) -> Self {
        DataError::MalformedRecord {
            dataset,
            reason: reason.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] std::io::Error),
    #[error("Invalid model: {0}")]
    InvalidModel(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::InvalidModel(err.to_string())
    }
}
