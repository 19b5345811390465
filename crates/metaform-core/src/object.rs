//! Object schemas and instances: named property lists bound together

use crate::error::{Error, Result};
use crate::id::{Identifier, InstanceId, PropertyId, SchemaId};
use crate::names::{DisplayName, InternalName};
use crate::property::PropertySchema;
use crate::value::{PropertyValue, RawValue};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A named, ordered collection of property schemas
///
/// The schema exclusively owns its property list. Appending moves the caller's
/// list in, so no other record can observe later changes to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSchema {
    #[serde(default)]
    id: SchemaId,
    display_name: DisplayName,
    internal_name: InternalName,
    #[serde(default)]
    properties: Vec<PropertySchema>,
}

impl ObjectSchema {
    pub fn new(display_name: DisplayName, internal_name: InternalName) -> Self {
        Self {
            id: SchemaId::UNPERSISTED,
            display_name,
            internal_name,
            properties: Vec::new(),
        }
    }

    /// Create a schema whose internal name is derived from the display name
    pub fn named(display_name: impl Into<String>) -> Result<Self> {
        let display_name = DisplayName::new(display_name)?;
        let internal_name = InternalName::derive_from(&display_name)?;
        Ok(Self::new(display_name, internal_name))
    }

    /// Append property schemas, keeping the existing ones in order
    pub fn add_properties(&mut self, properties: Vec<PropertySchema>) -> Result<()> {
        if properties.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "no properties given for schema '{}'",
                self.display_name
            )));
        }
        tracing::debug!(
            schema = %self.internal_name,
            added = properties.len(),
            total = self.properties.len() + properties.len(),
            "Appending properties"
        );
        self.properties.extend(properties);
        Ok(())
    }

    pub fn add_property(&mut self, property: PropertySchema) {
        tracing::debug!(schema = %self.internal_name, property = %property.name(), "Appending property");
        self.properties.push(property);
    }

    pub fn properties(&self) -> &[PropertySchema] {
        &self.properties
    }

    /// Let the persistence collaborator hand out property identifiers
    ///
    /// `assign` sees each property in order and returns its identifier. Nothing
    /// else about the properties can change through here.
    pub fn assign_property_ids(
        &mut self,
        mut assign: impl FnMut(&PropertySchema) -> PropertyId,
    ) {
        for property in &mut self.properties {
            let id = assign(property);
            if id != property.id() {
                property.assign_id(id);
            }
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn property_by_id(&self, id: PropertyId) -> Option<&PropertySchema> {
        self.properties.iter().find(|p| p.id() == id)
    }

    pub fn assign_id(&mut self, id: SchemaId) {
        tracing::trace!(schema = %self.internal_name, %id, "Assigned schema id");
        self.id = id;
    }

    pub fn with_id(mut self, id: SchemaId) -> Self {
        self.assign_id(id);
        self
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_persisted()
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn internal_name(&self) -> &InternalName {
        &self.internal_name
    }
}

/// Concrete data bound to one persisted object schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ObjectInstanceRecord")]
pub struct ObjectInstance {
    id: InstanceId,
    name: String,
    schema_id: SchemaId,
    values: Vec<PropertyValue>,
}

/// Serialized form of [`ObjectInstance`], checked on the way in
#[derive(Deserialize)]
struct ObjectInstanceRecord {
    #[serde(default)]
    id: InstanceId,
    name: String,
    schema_id: SchemaId,
    #[serde(default)]
    values: Vec<PropertyValue>,
}

impl TryFrom<ObjectInstanceRecord> for ObjectInstance {
    type Error = Error;

    fn try_from(record: ObjectInstanceRecord) -> Result<Self> {
        Self::check_name(&record.name)?;
        if !record.schema_id.is_persisted() {
            return Err(Error::UnpersistedReference(format!(
                "schema of instance '{}'",
                record.name
            )));
        }
        Ok(Self {
            id: record.id,
            name: record.name,
            schema_id: record.schema_id,
            values: record.values,
        })
    }
}

impl ObjectInstance {
    /// Create an instance of `schema`, which must already be persisted
    pub fn new(name: impl Into<String>, schema: &ObjectSchema) -> Result<Self> {
        let name = name.into();
        Self::check_name(&name)?;
        if !schema.is_persisted() {
            return Err(Error::UnpersistedReference(format!(
                "schema '{}'",
                schema.display_name()
            )));
        }
        Ok(Self {
            id: InstanceId::UNPERSISTED,
            name,
            schema_id: schema.id(),
            values: Vec::new(),
        })
    }

    fn check_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "instance name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Append property values, keeping the existing ones in order
    pub fn add_values(&mut self, values: Vec<PropertyValue>) -> Result<()> {
        if values.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "no property values given for instance '{}'",
                self.name
            )));
        }
        tracing::debug!(
            instance = %self.name,
            added = values.len(),
            total = self.values.len() + values.len(),
            "Appending property values"
        );
        self.values.extend(values);
        Ok(())
    }

    pub fn add_value(&mut self, value: PropertyValue) {
        tracing::debug!(instance = %self.name, property = %value.property_name(), "Appending property value");
        self.values.push(value);
    }

    /// Validate `raw` for the property called `property` and store it
    ///
    /// Replaces the value already bound to that property, or appends a new one.
    /// Nothing changes if validation fails.
    pub fn set_value(
        &mut self,
        schema: &ObjectSchema,
        property: &str,
        raw: impl Into<RawValue>,
    ) -> Result<()> {
        self.ensure_schema(schema)?;
        let property_schema = schema.property(property).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "schema '{}' has no property '{}'",
                schema.display_name(),
                property
            ))
        })?;

        match self
            .values
            .iter_mut()
            .find(|v| v.property_id() == property_schema.id())
        {
            Some(existing) => existing.assign(property_schema, raw),
            None => {
                let value = PropertyValue::bind(property_schema, raw)?;
                self.values.push(value);
                Ok(())
            }
        }
    }

    /// Check that the stored values conform to `schema`
    ///
    /// Every value must belong to a property of the schema with the same kind,
    /// no property may be bound twice, and every non-nullable property must
    /// hold a value.
    pub fn check_conformance(&self, schema: &ObjectSchema) -> Result<()> {
        self.ensure_schema(schema)?;

        let mut seen = HashSet::new();
        for value in &self.values {
            let property = schema.property_by_id(value.property_id()).ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "property '{}' ({}) is not declared by schema '{}'",
                    value.property_name(),
                    value.property_id(),
                    schema.display_name()
                ))
            })?;
            if property.kind() != value.kind() {
                return Err(Error::KindMismatch {
                    expected: property.kind(),
                    actual: value.kind(),
                });
            }
            if !seen.insert(value.property_id()) {
                return Err(Error::InvalidArgument(format!(
                    "property '{}' is bound more than once in instance '{}'",
                    value.property_name(),
                    self.name
                )));
            }
        }

        for property in schema.properties().iter().filter(|p| !p.is_nullable()) {
            let present = self
                .value_by_property(property.id())
                .is_some_and(|v| !v.is_absent());
            if !present {
                return Err(Error::MissingRequiredValue {
                    property: property.name().to_string(),
                });
            }
        }
        Ok(())
    }

    fn ensure_schema(&self, schema: &ObjectSchema) -> Result<()> {
        if schema.id() != self.schema_id {
            return Err(Error::InvalidArgument(format!(
                "instance '{}' references schema {}, not {}",
                self.name,
                self.schema_id,
                schema.id()
            )));
        }
        Ok(())
    }

    pub fn values(&self) -> &[PropertyValue] {
        &self.values
    }

    pub fn value(&self, property_name: &str) -> Option<&PropertyValue> {
        self.values.iter().find(|v| v.property_name() == property_name)
    }

    pub fn value_by_property(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.values.iter().find(|v| v.property_id() == id)
    }

    pub fn assign_id(&mut self, id: InstanceId) {
        tracing::trace!(instance = %self.name, %id, "Assigned instance id");
        self.id = id;
    }

    pub fn with_id(mut self, id: InstanceId) -> Self {
        self.assign_id(id);
        self
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_persisted()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_id(&self) -> SchemaId {
        self.schema_id
    }
}
