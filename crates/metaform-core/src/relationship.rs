//! Relationship (edge) types between schemas or between instances

use crate::error::{Error, Result};
use crate::id::{Identifier, InstanceId, RelationshipId, SchemaId};
use serde::{Deserialize, Serialize};

/// Cardinality of a directed source -> target relationship
///
/// Stored as a tag only. Enforcing it (e.g. one target per `OneToOne` source)
/// is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne = 1,
    ManyToOne = 2,
    ManyToMany = 3,
    OneToMany = 4,
}

impl Cardinality {
    /// Cardinality of the same relationship seen from the target
    pub fn inverse(self) -> Self {
        match self {
            Self::OneToMany => Self::ManyToOne,
            Self::ManyToOne => Self::OneToMany,
            other => other,
        }
    }

    pub fn source_is_many(self) -> bool {
        matches!(self, Self::ManyToOne | Self::ManyToMany)
    }

    pub fn target_is_many(self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::OneToOne => "one-to-one",
            Self::ManyToOne => "many-to-one",
            Self::ManyToMany => "many-to-many",
            Self::OneToMany => "one-to-many",
        };
        f.write_str(label)
    }
}

/// A directed, cardinality-tagged edge between two persisted records
///
/// Endpoints are bare identifiers. Resolving them to live records is the
/// persistence collaborator's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship<E> {
    #[serde(default)]
    id: RelationshipId,
    source: E,
    target: E,
    cardinality: Cardinality,
}

/// Edge between two entity schemas
pub type RelationshipSchema = Relationship<SchemaId>;

/// Edge between two entity instances
pub type RelationshipInstance = Relationship<InstanceId>;

impl<E: Identifier> Relationship<E> {
    /// Create an edge; both endpoints must already be persisted
    pub fn new(source: E, target: E, cardinality: Cardinality) -> Result<Self> {
        if !source.is_persisted() {
            return Err(Error::UnpersistedReference(format!("source {}", E::LABEL)));
        }
        if !target.is_persisted() {
            return Err(Error::UnpersistedReference(format!("target {}", E::LABEL)));
        }
        Ok(Self {
            id: RelationshipId::UNPERSISTED,
            source,
            target,
            cardinality,
        })
    }

    /// The back-edge from target to source, not yet persisted
    ///
    /// The model never records it automatically.
    pub fn reversed(&self) -> Self {
        Self {
            id: RelationshipId::UNPERSISTED,
            source: self.target,
            target: self.source,
            cardinality: self.cardinality.inverse(),
        }
    }

    pub fn assign_id(&mut self, id: RelationshipId) {
        self.id = id;
    }

    pub fn with_id(mut self, id: RelationshipId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> RelationshipId {
        self.id
    }

    pub fn source(&self) -> E {
        self.source
    }

    pub fn target(&self) -> E {
        self.target
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_self_referencing(&self) -> bool {
        self.source == self.target
    }
}
