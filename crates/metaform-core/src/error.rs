//! Error types for Metaform Core

use crate::kind::PropertyKind;
use thiserror::Error;

/// Result type alias using Metaform's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Metaform error types
///
/// Every variant is an ordinary rejected operation. The value or record the
/// operation targeted is left exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Missing required value for property '{property}'")]
    MissingRequiredValue { property: String },

    #[error("Malformed value for {kind} property '{property}': {reason}")]
    MalformedValue {
        property: String,
        kind: PropertyKind,
        reason: String,
    },

    #[error("Value too long for property '{property}': {len} chars (max {max})")]
    ValueTooLong {
        property: String,
        len: usize,
        max: usize,
    },

    #[error("Property '{property}' has an empty constraint set and accepts no value")]
    ConstraintSetEmpty { property: String },

    #[error("Value '{value}' is not allowed for property '{property}'")]
    ValueNotAllowed { property: String, value: String },

    #[error("Kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: PropertyKind,
        actual: PropertyKind,
    },

    #[error("Unpersisted reference: {0} has no identifier yet")]
    UnpersistedReference(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Fieldless tag for each error variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingRequiredValue,
    MalformedValue,
    ValueTooLong,
    ConstraintSetEmpty,
    ValueNotAllowed,
    KindMismatch,
    UnpersistedReference,
    InvalidArgument,
    Config,
}

impl Error {
    /// The taxonomy tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingRequiredValue { .. } => ErrorKind::MissingRequiredValue,
            Self::MalformedValue { .. } => ErrorKind::MalformedValue,
            Self::ValueTooLong { .. } => ErrorKind::ValueTooLong,
            Self::ConstraintSetEmpty { .. } => ErrorKind::ConstraintSetEmpty,
            Self::ValueNotAllowed { .. } => ErrorKind::ValueNotAllowed,
            Self::KindMismatch { .. } => ErrorKind::KindMismatch,
            Self::UnpersistedReference(_) => ErrorKind::UnpersistedReference,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn malformed(
        property: &str,
        kind: PropertyKind,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedValue {
            property: property.to_string(),
            kind,
            reason: reason.into(),
        }
    }
}
