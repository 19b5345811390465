//! Metaform Core - runtime-defined entity schemas
//!
//! This crate provides the schema graph (property kinds, property schemas,
//! object/entity/resource schemas, relationship schemas), the instance graph
//! that mirrors it, and the validator that keeps the two consistent.

pub mod config;
pub mod entity;
pub mod error;
pub mod id;
pub mod kind;
pub mod names;
pub mod object;
pub mod property;
pub mod relationship;
pub mod resource;
pub mod validate;
pub mod value;

pub use config::ModelConfig;
pub use entity::{EntityInstance, EntitySchema};
pub use error::{Error, ErrorKind, Result};
pub use id::{Identifier, InstanceId, PropertyId, RelationshipId, SchemaId};
pub use kind::{Constraint, DateFormat, PropertyKind, ResourceKind, DEFAULT_SHORT_TEXT_MAX_LEN};
pub use names::{DisplayName, InternalName};
pub use object::{ObjectInstance, ObjectSchema};
pub use property::PropertySchema;
pub use relationship::{Cardinality, Relationship, RelationshipInstance, RelationshipSchema};
pub use resource::{ResourceInstance, ResourceSchema};
pub use validate::validate;
pub use value::{PropertyValue, RawValue, ResourcePayload, Value};
