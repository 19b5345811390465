//! Entity schemas and instances: objects plus their outgoing relationships

use crate::error::{Error, Result};
use crate::id::{Identifier, InstanceId, PropertyId, RelationshipId, SchemaId};
use crate::names::{DisplayName, InternalName};
use crate::object::{ObjectInstance, ObjectSchema};
use crate::property::PropertySchema;
use crate::relationship::{Cardinality, Relationship, RelationshipInstance, RelationshipSchema};
use crate::value::{PropertyValue, RawValue};
use serde::{Deserialize, Serialize};

/// Check that every edge leaves `owner`, before anything is appended
fn ensure_outgoing<E: Identifier>(
    owner: E,
    owner_name: &str,
    relationships: &[Relationship<E>],
) -> Result<()> {
    if !owner.is_persisted() {
        return Err(Error::UnpersistedReference(format!(
            "{} '{}'",
            E::LABEL,
            owner_name
        )));
    }
    if let Some(foreign) = relationships.iter().find(|r| r.source() != owner) {
        return Err(Error::InvalidArgument(format!(
            "relationship from {} {} cannot be attached to {} {}",
            E::LABEL,
            foreign.source(),
            E::LABEL,
            owner
        )));
    }
    for relationship in relationships {
        relationship.target().ensure_persisted()?;
    }
    Ok(())
}

/// Top-level definition: an object schema with outgoing relationship schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EntitySchemaRecord")]
pub struct EntitySchema {
    object: ObjectSchema,
    relationships: Vec<RelationshipSchema>,
}

#[derive(Deserialize)]
struct EntitySchemaRecord {
    object: ObjectSchema,
    #[serde(default)]
    relationships: Vec<RelationshipSchema>,
}

impl TryFrom<EntitySchemaRecord> for EntitySchema {
    type Error = Error;

    fn try_from(record: EntitySchemaRecord) -> Result<Self> {
        if !record.relationships.is_empty() {
            ensure_outgoing(
                record.object.id(),
                record.object.display_name().as_str(),
                &record.relationships,
            )?;
        }
        Ok(Self {
            object: record.object,
            relationships: record.relationships,
        })
    }
}

impl EntitySchema {
    pub fn new(display_name: DisplayName, internal_name: InternalName) -> Self {
        Self {
            object: ObjectSchema::new(display_name, internal_name),
            relationships: Vec::new(),
        }
    }

    /// Create an entity schema whose internal name is derived from the display name
    pub fn named(display_name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            object: ObjectSchema::named(display_name)?,
            relationships: Vec::new(),
        })
    }

    pub fn add_properties(&mut self, properties: Vec<PropertySchema>) -> Result<()> {
        self.object.add_properties(properties)
    }

    pub fn add_property(&mut self, property: PropertySchema) {
        self.object.add_property(property);
    }

    /// Append outgoing relationships, keeping the existing ones in order
    ///
    /// The entity must be persisted and every relationship must have it as
    /// source. Either all relationships are appended or none.
    pub fn add_relationships(&mut self, relationships: Vec<RelationshipSchema>) -> Result<()> {
        if relationships.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "no relationships given for entity schema '{}'",
                self.object.display_name()
            )));
        }
        ensure_outgoing(
            self.object.id(),
            self.object.display_name().as_str(),
            &relationships,
        )?;
        tracing::debug!(
            schema = %self.object.internal_name(),
            added = relationships.len(),
            total = self.relationships.len() + relationships.len(),
            "Appending relationship schemas"
        );
        self.relationships.extend(relationships);
        Ok(())
    }

    pub fn add_relationship(&mut self, relationship: RelationshipSchema) -> Result<()> {
        self.add_relationships(vec![relationship])
    }

    /// Build an edge from this entity to `target` without attaching it
    pub fn relate_to(
        &self,
        target: &EntitySchema,
        cardinality: Cardinality,
    ) -> Result<RelationshipSchema> {
        RelationshipSchema::new(self.id(), target.id(), cardinality)
    }

    pub fn relationships(&self) -> &[RelationshipSchema] {
        &self.relationships
    }

    /// Let the persistence collaborator hand out relationship identifiers;
    /// endpoints and cardinality stay as attached
    pub fn assign_relationship_ids(
        &mut self,
        mut assign: impl FnMut(&RelationshipSchema) -> RelationshipId,
    ) {
        for relationship in &mut self.relationships {
            let id = assign(relationship);
            relationship.assign_id(id);
        }
    }

    /// See [`ObjectSchema::assign_property_ids`]
    pub fn assign_property_ids(&mut self, assign: impl FnMut(&PropertySchema) -> PropertyId) {
        self.object.assign_property_ids(assign);
    }

    pub fn object(&self) -> &ObjectSchema {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut ObjectSchema {
        &mut self.object
    }

    pub fn id(&self) -> SchemaId {
        self.object.id()
    }

    pub fn assign_id(&mut self, id: SchemaId) {
        self.object.assign_id(id);
    }

    pub fn with_id(mut self, id: SchemaId) -> Self {
        self.object.assign_id(id);
        self
    }

    pub fn display_name(&self) -> &DisplayName {
        self.object.display_name()
    }

    pub fn internal_name(&self) -> &InternalName {
        self.object.internal_name()
    }

    pub fn properties(&self) -> &[PropertySchema] {
        self.object.properties()
    }
}

/// Top-level data record: an object instance with outgoing relationship instances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EntityInstanceRecord")]
pub struct EntityInstance {
    object: ObjectInstance,
    relationships: Vec<RelationshipInstance>,
}

#[derive(Deserialize)]
struct EntityInstanceRecord {
    object: ObjectInstance,
    #[serde(default)]
    relationships: Vec<RelationshipInstance>,
}

impl TryFrom<EntityInstanceRecord> for EntityInstance {
    type Error = Error;

    fn try_from(record: EntityInstanceRecord) -> Result<Self> {
        if !record.relationships.is_empty() {
            ensure_outgoing(record.object.id(), record.object.name(), &record.relationships)?;
        }
        Ok(Self {
            object: record.object,
            relationships: record.relationships,
        })
    }
}

impl EntityInstance {
    /// Create an instance of `schema`, which must already be persisted
    pub fn new(name: impl Into<String>, schema: &EntitySchema) -> Result<Self> {
        Ok(Self {
            object: ObjectInstance::new(name, schema.object())?,
            relationships: Vec::new(),
        })
    }

    pub fn add_values(&mut self, values: Vec<PropertyValue>) -> Result<()> {
        self.object.add_values(values)
    }

    pub fn add_value(&mut self, value: PropertyValue) {
        self.object.add_value(value);
    }

    pub fn set_value(
        &mut self,
        schema: &EntitySchema,
        property: &str,
        raw: impl Into<RawValue>,
    ) -> Result<()> {
        self.object.set_value(schema.object(), property, raw)
    }

    pub fn check_conformance(&self, schema: &EntitySchema) -> Result<()> {
        self.object.check_conformance(schema.object())
    }

    /// Append outgoing relationships, keeping the existing ones in order
    ///
    /// Same rules as [`EntitySchema::add_relationships`].
    pub fn add_relationships(&mut self, relationships: Vec<RelationshipInstance>) -> Result<()> {
        if relationships.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "no relationships given for entity instance '{}'",
                self.object.name()
            )));
        }
        ensure_outgoing(self.object.id(), self.object.name(), &relationships)?;
        tracing::debug!(
            instance = %self.object.name(),
            added = relationships.len(),
            total = self.relationships.len() + relationships.len(),
            "Appending relationship instances"
        );
        self.relationships.extend(relationships);
        Ok(())
    }

    pub fn add_relationship(&mut self, relationship: RelationshipInstance) -> Result<()> {
        self.add_relationships(vec![relationship])
    }

    pub fn relate_to(
        &self,
        target: &EntityInstance,
        cardinality: Cardinality,
    ) -> Result<RelationshipInstance> {
        RelationshipInstance::new(self.id(), target.id(), cardinality)
    }

    pub fn relationships(&self) -> &[RelationshipInstance] {
        &self.relationships
    }

    pub fn assign_relationship_ids(
        &mut self,
        mut assign: impl FnMut(&RelationshipInstance) -> RelationshipId,
    ) {
        for relationship in &mut self.relationships {
            let id = assign(relationship);
            relationship.assign_id(id);
        }
    }

    pub fn object(&self) -> &ObjectInstance {
        &self.object
    }

    pub fn object_mut(&mut self) -> &mut ObjectInstance {
        &mut self.object
    }

    pub fn id(&self) -> InstanceId {
        self.object.id()
    }

    pub fn assign_id(&mut self, id: InstanceId) {
        self.object.assign_id(id);
    }

    pub fn with_id(mut self, id: InstanceId) -> Self {
        self.object.assign_id(id);
        self
    }

    pub fn name(&self) -> &str {
        self.object.name()
    }

    pub fn schema_id(&self) -> SchemaId {
        self.object.schema_id()
    }

    pub fn values(&self) -> &[PropertyValue] {
        self.object.values()
    }
}
