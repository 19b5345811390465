//! Store trait definitions

use crate::error::{StorageError, StorageResult};
use metaform_core::{
    EntityInstance, EntitySchema, InstanceId, PropertyId, PropertySchema, ResourceInstance,
    ResourceSchema, SchemaId,
};

/// Trait for the collaborator that persists schemas and instances
///
/// Saving a record with identifier `0` assigns the next free identifier;
/// saving one with a non-zero identifier replaces the stored record.
pub trait SchemaStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Property Schemas
    // ─────────────────────────────────────────────────────────────────────────

    /// Save a standalone property schema
    fn save_property(&self, property: PropertySchema) -> StorageResult<PropertySchema>;

    /// Get a property schema by ID
    fn get_property(&self, id: PropertyId) -> StorageResult<Option<PropertySchema>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Schemas
    // ─────────────────────────────────────────────────────────────────────────

    /// Save an entity schema, assigning IDs to it and to its unpersisted
    /// properties and relationships
    fn save_entity_schema(&self, schema: EntitySchema) -> StorageResult<EntitySchema>;

    /// Get an entity schema by ID
    fn get_entity_schema(&self, id: SchemaId) -> StorageResult<Option<EntitySchema>>;

    /// Find an entity schema by display name
    fn find_entity_schema(&self, display_name: &str) -> StorageResult<Option<EntitySchema>>;

    /// Get all entity schemas, ordered by ID
    fn list_entity_schemas(&self) -> StorageResult<Vec<EntitySchema>>;

    /// Save a resource schema
    fn save_resource_schema(&self, schema: ResourceSchema) -> StorageResult<ResourceSchema>;

    /// Get a resource schema by ID
    fn get_resource_schema(&self, id: SchemaId) -> StorageResult<Option<ResourceSchema>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Instances
    // ─────────────────────────────────────────────────────────────────────────

    /// Save an entity instance after checking it against its stored schema
    fn save_entity_instance(&self, instance: EntityInstance) -> StorageResult<EntityInstance>;

    /// Get an entity instance by ID
    fn get_entity_instance(&self, id: InstanceId) -> StorageResult<Option<EntityInstance>>;

    /// Get all instances of an entity schema, ordered by ID
    fn list_entity_instances(&self, schema: SchemaId) -> StorageResult<Vec<EntityInstance>>;

    /// Save a resource instance
    fn save_resource_instance(
        &self,
        instance: ResourceInstance,
    ) -> StorageResult<ResourceInstance>;

    /// Get a resource instance by ID
    fn get_resource_instance(&self, id: InstanceId) -> StorageResult<Option<ResourceInstance>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve the target schemas of an entity schema's relationships
    fn resolve_targets(&self, schema: &EntitySchema) -> StorageResult<Vec<EntitySchema>> {
        schema
            .relationships()
            .iter()
            .map(|r| {
                self.get_entity_schema(r.target())?.ok_or_else(|| {
                    StorageError::NotFound(format!("entity schema {}", r.target()))
                })
            })
            .collect()
    }

    /// Resolve the target instances of an entity instance's relationships
    fn resolve_linked(&self, instance: &EntityInstance) -> StorageResult<Vec<EntityInstance>> {
        instance
            .relationships()
            .iter()
            .map(|r| {
                self.get_entity_instance(r.target())?.ok_or_else(|| {
                    StorageError::NotFound(format!("entity instance {}", r.target()))
                })
            })
            .collect()
    }

    /// Check a stored instance against the schema it references
    fn check_instance(&self, id: InstanceId) -> StorageResult<()> {
        let instance = self
            .get_entity_instance(id)?
            .ok_or_else(|| StorageError::NotFound(format!("entity instance {}", id)))?;
        let schema = self.get_entity_schema(instance.schema_id())?.ok_or_else(|| {
            StorageError::NotFound(format!("entity schema {}", instance.schema_id()))
        })?;
        instance.check_conformance(&schema)?;
        Ok(())
    }
}
