use thiserror::Error;
use uuid::Uuid;

use crate::models::profile::RecordKind;

/// Failures surfaced by the ledger, the record store, and the import path.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Input rejected before any write happened.
    #[error("{0}")]
    Validation(String),
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("{kind} record {id} not found")]
    NotFound { kind: RecordKind, id: String },
    #[error("Pending income {0} has already been cleared")]
    AlreadyCleared(Uuid),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Line {line}: {source}")]
    Import {
        line: usize,
        #[source]
        source: Box<TrackerError>,
    },
}

impl TrackerError {
    pub fn validation(message: impl Into<String>) -> Self {
        TrackerError::Validation(message.into())
    }

    pub fn not_found(kind: RecordKind, id: impl ToString) -> Self {
        TrackerError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
