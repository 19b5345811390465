//! Storage error types

use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate schema display name: {0}")]
    DuplicateSchema(String),

    #[error("Identifier already in use: {0}")]
    IdConflict(String),

    #[error("Undeclared relationship: {0}")]
    UndeclaredRelationship(String),

    #[error("Cardinality violation: {0}")]
    CardinalityViolation(String),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error(transparent)]
    Model(#[from] metaform_core::Error),
}
