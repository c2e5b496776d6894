// src/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupted log at line {line}: {reason}")]
    Corruption { line: usize, reason: String },

    #[error("Invalid connection string '{0}'")]
    InvalidConnectionString(String),

    #[error("Invalid database name '{0}'")]
    InvalidDatabaseName(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Document store unavailable")]
    Unavailable,
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
