//! Error types for the records crate.

use thiserror::Error;

/// Errors raised by a [`BlobStore`](crate::store::BlobStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Errors raised while encoding or decoding a collection.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Empty blob")]
    Empty,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised when a repository reads or writes its storage slot.
///
/// These never abort a mutation: the in-memory collection is already
/// updated when a persist fails.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Read failed for {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("Write to {key} withheld until the slot can be read")]
    Withheld { key: String },

    #[error("Encode failed for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: CodecError,
    },

    #[error("Write failed for {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: StoreError,
    },
}

/// Input rejected before it reaches a repository.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Amount must be a finite, non-negative number, got {0}")]
    InvalidAmount(f64),

    #[error("Cost must be a finite, non-negative number, got {0}")]
    InvalidCost(f64),

    #[error("{0} must not be empty")]
    Blank(&'static str),
}

impl ValidationError {
    /// Reject `value` when it is empty after trimming.
    pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::Blank(field))
        } else {
            Ok(())
        }
    }
}
