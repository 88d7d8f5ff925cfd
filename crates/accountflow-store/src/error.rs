//! Error types for accountflow-store

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Snapshot is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error")]
    IoError(#[from] io::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Result type with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
