use thiserror::Error;

use crate::{AggregateId, Version};

/// Errors raised by the persistence adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The aggregate moved past the version the caller loaded.
    #[error(
        "Concurrency conflict for aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// A batch of events was rejected before reaching storage.
    #[error("Invalid append: {0}")]
    InvalidAppend(String),

    /// A value cannot be represented in the storage schema.
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// A row read back from storage violates a type invariant.
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
