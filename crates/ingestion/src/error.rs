//! Ingestion error types

use contracts::ContractError;
use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Required logical columns are absent from the header
    #[error("malformed sample stream: missing required fields {missing:?}")]
    MalformedInput {
        /// Logical names of the missing fields
        missing: Vec<String>,
    },

    /// Every data row was dropped
    #[error("no usable samples in {rows} data rows")]
    NoUsableSamples {
        /// Data rows inspected
        rows: usize,
    },

    /// Transport failure while fetching the raw text
    #[error(transparent)]
    Fetch(#[from] ContractError),
}

impl From<IngestionError> for ContractError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::MalformedInput { missing } => ContractError::MalformedInput { missing },
            IngestionError::NoUsableSamples { rows } => {
                ContractError::Other(format!("no usable samples in {rows} data rows"))
            }
            IngestionError::Fetch(inner) => inner,
        }
    }
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
