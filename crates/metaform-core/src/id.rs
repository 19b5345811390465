//! Identifier types assigned by the persistence collaborator
//!
//! An identifier of `0` means the record has not been persisted yet. Such a
//! record may exist and be edited, but nothing else may reference it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Common behaviour of every identifier newtype
pub trait Identifier: Copy + Eq + std::fmt::Debug + std::fmt::Display {
    /// Short noun used in error messages ("schema", "instance", ...)
    const LABEL: &'static str;

    /// Raw numeric value
    fn get(self) -> u64;

    /// Whether a store has assigned this identifier
    fn is_persisted(self) -> bool {
        self.get() != 0
    }

    /// Fail with `UnpersistedReference` unless the identifier is non-zero
    fn ensure_persisted(self) -> Result<Self> {
        if self.is_persisted() {
            Ok(self)
        } else {
            Err(Error::UnpersistedReference(Self::LABEL.to_string()))
        }
    }
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// The "not yet persisted" identifier
            pub const UNPERSISTED: Self = Self(0);

            pub fn new(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl Identifier for $name {
            const LABEL: &'static str = $label;

            fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a property schema
    PropertyId,
    "property schema"
);

define_id!(
    /// Identifier of an object, entity or resource schema
    SchemaId,
    "schema"
);

define_id!(
    /// Identifier of an object, entity or resource instance
    InstanceId,
    "instance"
);

define_id!(
    /// Identifier of a relationship schema or instance
    RelationshipId,
    "relationship"
);
