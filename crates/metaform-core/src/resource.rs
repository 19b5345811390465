//! Resource schemas and instances
//!
//! A resource object owns exactly one resource property whose category
//! matches the resource object's own category.

use crate::error::{Error, Result};
use crate::id::{InstanceId, PropertyId, SchemaId};
use crate::kind::{PropertyKind, ResourceKind};
use crate::names::{DisplayName, InternalName};
use crate::object::{ObjectInstance, ObjectSchema};
use crate::property::PropertySchema;
use crate::value::{PropertyValue, ResourcePayload};
use serde::{Deserialize, Serialize};

fn ensure_category(category: ResourceKind, actual: PropertyKind) -> Result<()> {
    let expected = PropertyKind::Resource(category);
    if actual != expected {
        return Err(Error::KindMismatch { expected, actual });
    }
    Ok(())
}

/// Definition of a resource object, e.g. an image or a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResourceSchemaRecord")]
pub struct ResourceSchema {
    object: ObjectSchema,
    category: ResourceKind,
    resource_property: PropertySchema,
}

#[derive(Deserialize)]
struct ResourceSchemaRecord {
    object: ObjectSchema,
    category: ResourceKind,
    resource_property: PropertySchema,
}

impl TryFrom<ResourceSchemaRecord> for ResourceSchema {
    type Error = Error;

    fn try_from(record: ResourceSchemaRecord) -> Result<Self> {
        Self::check_resource_property(record.category, &record.resource_property)?;
        Ok(Self {
            object: record.object,
            category: record.category,
            resource_property: record.resource_property,
        })
    }
}

impl ResourceSchema {
    /// Create a resource schema around a persisted resource property of the
    /// same category
    pub fn new(
        category: ResourceKind,
        display_name: DisplayName,
        internal_name: InternalName,
        resource_property: PropertySchema,
    ) -> Result<Self> {
        Self::check_resource_property(category, &resource_property)?;
        Ok(Self {
            object: ObjectSchema::new(display_name, internal_name),
            category,
            resource_property,
        })
    }

    fn check_resource_property(category: ResourceKind, property: &PropertySchema) -> Result<()> {
        ensure_category(category, property.kind())?;
        if !property.is_persisted() {
            return Err(Error::UnpersistedReference(format!(
                "resource property '{}'",
                property.name()
            )));
        }
        Ok(())
    }

    /// Replace the resource property; its category must match this schema's
    pub fn set_resource_property(&mut self, property: PropertySchema) -> Result<()> {
        Self::check_resource_property(self.category, &property)?;
        tracing::debug!(
            schema = %self.object.internal_name(),
            property = %property.name(),
            "Replaced resource property schema"
        );
        self.resource_property = property;
        Ok(())
    }

    pub fn category(&self) -> ResourceKind {
        self.category
    }

    pub fn resource_property(&self) -> &PropertySchema {
        &self.resource_property
    }

    /// Record the identifier the persistence collaborator gave the resource
    /// property
    pub fn assign_resource_property_id(&mut self, id: PropertyId) {
        self.resource_property.assign_id(id);
    }

    /// See [`ObjectSchema::assign_property_ids`]
    pub fn assign_property_ids(&mut self, assign: impl FnMut(&PropertySchema) -> PropertyId) {
        self.object.assign_property_ids(assign);
    }

    pub fn add_properties(&mut self, properties: Vec<PropertySchema>) -> Result<()> {
        self.object.add_properties(properties)
    }

    pub fn add_property(&mut self, property: PropertySchema) {
        self.object.add_property(property);
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
}

/// A stored resource: object instance plus its resource property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ResourceInstanceRecord")]
pub struct ResourceInstance {
    object: ObjectInstance,
    category: ResourceKind,
    resource_value: PropertyValue,
}

#[derive(Deserialize)]
struct ResourceInstanceRecord {
    object: ObjectInstance,
    category: ResourceKind,
    resource_value: PropertyValue,
}

impl TryFrom<ResourceInstanceRecord> for ResourceInstance {
    type Error = Error;

    fn try_from(record: ResourceInstanceRecord) -> Result<Self> {
        ensure_category(record.category, record.resource_value.kind())?;
        Ok(Self {
            object: record.object,
            category: record.category,
            resource_value: record.resource_value,
        })
    }
}

impl ResourceInstance {
    /// Create an instance of a persisted resource schema with an already bound
    /// resource value of the same category
    pub fn new(
        name: impl Into<String>,
        schema: &ResourceSchema,
        resource_value: PropertyValue,
    ) -> Result<Self> {
        ensure_category(schema.category(), resource_value.kind())?;
        Ok(Self {
            object: ObjectInstance::new(name, schema.object())?,
            category: schema.category(),
            resource_value,
        })
    }

    /// Validate `payload` through the schema's resource property and create the
    /// instance around it
    pub fn from_payload(
        name: impl Into<String>,
        schema: &ResourceSchema,
        payload: ResourcePayload,
    ) -> Result<Self> {
        let value = PropertyValue::bind(schema.resource_property(), payload)?;
        Self::new(name, schema, value)
    }

    /// Replace the resource value; its category must match this instance's
    pub fn set_resource_value(&mut self, value: PropertyValue) -> Result<()> {
        ensure_category(self.category, value.kind())?;
        tracing::debug!(
            instance = %self.object.name(),
            property = %value.property_name(),
            "Replaced resource property value"
        );
        self.resource_value = value;
        Ok(())
    }

    pub fn category(&self) -> ResourceKind {
        self.category
    }

    pub fn resource_value(&self) -> &PropertyValue {
        &self.resource_value
    }

    pub fn payload(&self) -> Option<&ResourcePayload> {
        self.resource_value.value().and_then(|v| v.as_resource())
    }

    pub fn add_values(&mut self, values: Vec<PropertyValue>) -> Result<()> {
        self.object.add_values(values)
    }

    pub fn add_value(&mut self, value: PropertyValue) {
        self.object.add_value(value);
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
}
