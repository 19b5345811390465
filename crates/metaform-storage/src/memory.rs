//! In-memory store
//!
//! Records live in identifier-keyed tables and reference each other by
//! identifier only, so no record ever owns another.

use crate::error::{StorageError, StorageResult};
use crate::traits::SchemaStore;
use metaform_core::{
    EntityInstance, EntitySchema, Identifier, InstanceId, PropertyId, PropertySchema,
    RelationshipId, ResourceInstance, ResourceSchema, SchemaId,
};
use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Hand out the next identifier when `current` is unpersisted, otherwise keep
/// `current` and make sure later allocations stay above it
fn allocate(last: &mut u64, current: u64) -> u64 {
    if current == 0 {
        *last += 1;
        *last
    } else {
        *last = (*last).max(current);
        current
    }
}

#[derive(Debug, Default)]
struct Tables {
    properties: HashMap<PropertyId, PropertySchema>,
    property_owners: HashMap<PropertyId, SchemaId>,
    entity_schemas: HashMap<SchemaId, EntitySchema>,
    resource_schemas: HashMap<SchemaId, ResourceSchema>,
    entity_instances: HashMap<InstanceId, EntityInstance>,
    resource_instances: HashMap<InstanceId, ResourceInstance>,
    last_property: u64,
    last_schema: u64,
    last_instance: u64,
    last_relationship: u64,
}

impl Tables {
    /// A property identifier may only come back as the same property, and for
    /// the schema that already holds it
    fn check_properties<'a>(
        &self,
        properties: impl IntoIterator<Item = &'a PropertySchema>,
        owner: Option<SchemaId>,
    ) -> StorageResult<()> {
        let mut seen = HashSet::new();
        for property in properties {
            if !property.is_persisted() {
                continue;
            }
            if !seen.insert(property.id()) {
                return Err(StorageError::IdConflict(format!(
                    "property {} is given twice",
                    property.id()
                )));
            }
            if let Some(stored) = self.properties.get(&property.id()) {
                let foreign_owner = match (self.property_owners.get(&property.id()), owner) {
                    (Some(held), Some(owner)) => *held != owner,
                    _ => false,
                };
                if foreign_owner
                    || stored.name() != property.name()
                    || stored.kind() != property.kind()
                {
                    return Err(StorageError::IdConflict(format!(
                        "property {} is already held by '{}' ({})",
                        property.id(),
                        stored.name(),
                        stored.kind()
                    )));
                }
            }
        }
        Ok(())
    }

    fn property_id(&mut self, property: &PropertySchema) -> PropertyId {
        PropertyId::new(allocate(&mut self.last_property, property.id().get()))
    }

    fn register_properties<'a>(
        &mut self,
        properties: impl IntoIterator<Item = &'a PropertySchema>,
        owner: Option<SchemaId>,
    ) {
        for property in properties {
            self.properties.insert(property.id(), property.clone());
            if let Some(owner) = owner {
                self.property_owners.insert(property.id(), owner);
            }
        }
    }

    fn relationship_id(&mut self, current: RelationshipId) -> RelationshipId {
        RelationshipId::new(allocate(&mut self.last_relationship, current.get()))
    }

    /// Schema of an instance, looking at the pending record first
    fn instance_schema(&self, id: InstanceId, pending: &EntityInstance) -> Option<SchemaId> {
        if id == pending.id() {
            return Some(pending.schema_id());
        }
        self.entity_instances.get(&id).map(|i| i.schema_id())
    }

    /// Every instance edge must follow an edge its schema declares
    fn check_declared(&self, instance: &EntityInstance, schema: &EntitySchema) -> StorageResult<()> {
        for edge in instance.relationships() {
            let target_schema = self.instance_schema(edge.target(), instance).ok_or_else(|| {
                StorageError::NotFound(format!("entity instance {}", edge.target()))
            })?;
            let declared = schema
                .relationships()
                .iter()
                .any(|r| r.target() == target_schema && r.cardinality() == edge.cardinality());
            if !declared {
                return Err(StorageError::UndeclaredRelationship(format!(
                    "schema '{}' declares no {} relationship to schema {}",
                    schema.display_name(),
                    edge.cardinality(),
                    target_schema
                )));
            }
        }
        Ok(())
    }

    /// Enforce the cardinality tags of an instance's outgoing edges
    fn check_cardinality(&self, instance: &EntityInstance) -> StorageResult<()> {
        let mut single_targets = HashMap::new();
        for edge in instance.relationships() {
            let target_schema = self.instance_schema(edge.target(), instance);

            if !edge.cardinality().target_is_many() {
                let key = (target_schema, edge.cardinality());
                if let Some(previous) = single_targets.insert(key, edge.target()) {
                    if previous != edge.target() {
                        return Err(StorageError::CardinalityViolation(format!(
                            "instance '{}' has more than one {} target ({} and {})",
                            instance.name(),
                            edge.cardinality(),
                            previous,
                            edge.target()
                        )));
                    }
                }
            }

            if !edge.cardinality().source_is_many() {
                let taken = self.entity_instances.values().find(|other| {
                    other.id() != instance.id()
                        && other.schema_id() == instance.schema_id()
                        && other.relationships().iter().any(|r| {
                            r.target() == edge.target() && r.cardinality() == edge.cardinality()
                        })
                });
                if let Some(other) = taken {
                    return Err(StorageError::CardinalityViolation(format!(
                        "instance {} already has a {} source '{}'",
                        edge.target(),
                        edge.cardinality(),
                        other.name()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// In-memory store
///
/// Useful for testing and as the reference identity collaborator.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Identifiers of every stored instance that references `schema`
    ///
    /// The model never removes records; callers check this before retiring a
    /// schema on their side.
    pub fn dependents_of(&self, schema: SchemaId) -> StorageResult<Vec<InstanceId>> {
        let tables = self.read()?;
        let mut ids: Vec<InstanceId> = tables
            .entity_instances
            .values()
            .filter(|i| i.schema_id() == schema)
            .map(|i| i.id())
            .chain(
                tables
                    .resource_instances
                    .values()
                    .filter(|i| i.schema_id() == schema)
                    .map(|i| i.id()),
            )
            .collect();
        ids.sort();
        Ok(ids)
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaStore for MemoryStore {
    // Property schemas

    fn save_property(&self, mut property: PropertySchema) -> StorageResult<PropertySchema> {
        let mut guard = self.write()?;
        let tables = &mut *guard;
        tables.check_properties([&property], None)?;
        let id = tables.property_id(&property);
        property.assign_id(id);
        tables.register_properties([&property], None);
        tracing::debug!(id = %property.id(), name = %property.name(), "Saved property schema");
        Ok(property)
    }

    fn get_property(&self, id: PropertyId) -> StorageResult<Option<PropertySchema>> {
        Ok(self.read()?.properties.get(&id).cloned())
    }

    // Schemas

    fn save_entity_schema(&self, mut schema: EntitySchema) -> StorageResult<EntitySchema> {
        let mut guard = self.write()?;
        let tables = &mut *guard;

        if tables.resource_schemas.contains_key(&schema.id()) {
            return Err(StorageError::IdConflict(format!(
                "schema {} is a resource schema",
                schema.id()
            )));
        }
        let duplicate = tables
            .entity_schemas
            .values()
            .any(|s| s.id() != schema.id() && s.display_name() == schema.display_name());
        if duplicate {
            return Err(StorageError::DuplicateSchema(
                schema.display_name().to_string(),
            ));
        }
        for relationship in schema.relationships() {
            let target = relationship.target();
            if target != schema.id() && !tables.entity_schemas.contains_key(&target) {
                return Err(StorageError::NotFound(format!("entity schema {}", target)));
            }
        }
        tables.check_properties(schema.properties(), Some(schema.id()))?;

        let id = allocate(&mut tables.last_schema, schema.id().get());
        schema.assign_id(SchemaId::new(id));
        schema.assign_property_ids(|p| tables.property_id(p));
        schema.assign_relationship_ids(|r| tables.relationship_id(r.id()));
        tables.register_properties(schema.properties(), Some(schema.id()));

        tracing::debug!(
            id = %schema.id(),
            name = %schema.display_name(),
            properties = schema.properties().len(),
            relationships = schema.relationships().len(),
            "Saved entity schema"
        );
        tables.entity_schemas.insert(schema.id(), schema.clone());
        Ok(schema)
    }

    fn get_entity_schema(&self, id: SchemaId) -> StorageResult<Option<EntitySchema>> {
        Ok(self.read()?.entity_schemas.get(&id).cloned())
    }

    fn find_entity_schema(&self, display_name: &str) -> StorageResult<Option<EntitySchema>> {
        Ok(self
            .read()?
            .entity_schemas
            .values()
            .find(|s| s.display_name().as_str() == display_name)
            .cloned())
    }

    fn list_entity_schemas(&self) -> StorageResult<Vec<EntitySchema>> {
        let mut schemas: Vec<EntitySchema> = self.read()?.entity_schemas.values().cloned().collect();
        schemas.sort_by_key(|s| s.id());
        Ok(schemas)
    }

    fn save_resource_schema(&self, mut schema: ResourceSchema) -> StorageResult<ResourceSchema> {
        let mut guard = self.write()?;
        let tables = &mut *guard;

        if tables.entity_schemas.contains_key(&schema.id()) {
            return Err(StorageError::IdConflict(format!(
                "schema {} is an entity schema",
                schema.id()
            )));
        }
        let duplicate = tables
            .resource_schemas
            .values()
            .any(|s| s.id() != schema.id() && s.display_name() == schema.display_name());
        if duplicate {
            return Err(StorageError::DuplicateSchema(
                schema.display_name().to_string(),
            ));
        }
        let properties = schema.object().properties().iter();
        tables.check_properties(
            properties.chain([schema.resource_property()]),
            Some(schema.id()),
        )?;

        let id = allocate(&mut tables.last_schema, schema.id().get());
        schema.assign_id(SchemaId::new(id));
        let resource_property_id = tables.property_id(schema.resource_property());
        schema.assign_resource_property_id(resource_property_id);
        schema.assign_property_ids(|p| tables.property_id(p));
        tables.register_properties(
            schema.object().properties().iter().chain([schema.resource_property()]),
            Some(schema.id()),
        );

        tracing::debug!(
            id = %schema.id(),
            name = %schema.display_name(),
            category = %schema.category(),
            "Saved resource schema"
        );
        tables.resource_schemas.insert(schema.id(), schema.clone());
        Ok(schema)
    }

    fn get_resource_schema(&self, id: SchemaId) -> StorageResult<Option<ResourceSchema>> {
        Ok(self.read()?.resource_schemas.get(&id).cloned())
    }

    // Instances

    fn save_entity_instance(&self, mut instance: EntityInstance) -> StorageResult<EntityInstance> {
        let mut guard = self.write()?;
        let tables = &mut *guard;

        if tables.resource_instances.contains_key(&instance.id()) {
            return Err(StorageError::IdConflict(format!(
                "instance {} is a resource instance",
                instance.id()
            )));
        }
        let schema = tables
            .entity_schemas
            .get(&instance.schema_id())
            .ok_or_else(|| {
                StorageError::NotFound(format!("entity schema {}", instance.schema_id()))
            })?;
        instance.check_conformance(schema)?;
        tables.check_declared(&instance, schema)?;
        tables.check_cardinality(&instance)?;

        let id = allocate(&mut tables.last_instance, instance.id().get());
        instance.assign_id(InstanceId::new(id));
        instance.assign_relationship_ids(|r| tables.relationship_id(r.id()));

        tracing::debug!(
            id = %instance.id(),
            name = %instance.name(),
            schema = %instance.schema_id(),
            "Saved entity instance"
        );
        tables.entity_instances.insert(instance.id(), instance.clone());
        Ok(instance)
    }

    fn get_entity_instance(&self, id: InstanceId) -> StorageResult<Option<EntityInstance>> {
        Ok(self.read()?.entity_instances.get(&id).cloned())
    }

    fn list_entity_instances(&self, schema: SchemaId) -> StorageResult<Vec<EntityInstance>> {
        let mut instances: Vec<EntityInstance> = self
            .read()?
            .entity_instances
            .values()
            .filter(|i| i.schema_id() == schema)
            .cloned()
            .collect();
        instances.sort_by_key(|i| i.id());
        Ok(instances)
    }

    fn save_resource_instance(
        &self,
        mut instance: ResourceInstance,
    ) -> StorageResult<ResourceInstance> {
        let mut guard = self.write()?;
        let tables = &mut *guard;

        if tables.entity_instances.contains_key(&instance.id()) {
            return Err(StorageError::IdConflict(format!(
                "instance {} is an entity instance",
                instance.id()
            )));
        }
        let schema = tables
            .resource_schemas
            .get(&instance.schema_id())
            .ok_or_else(|| {
                StorageError::NotFound(format!("resource schema {}", instance.schema_id()))
            })?;
        instance.object().check_conformance(schema.object())?;

        let id = allocate(&mut tables.last_instance, instance.id().get());
        instance.assign_id(InstanceId::new(id));

        tracing::debug!(
            id = %instance.id(),
            name = %instance.name(),
            bytes = instance.payload().map_or(0, |p| p.len()),
            "Saved resource instance"
        );
        tables.resource_instances.insert(instance.id(), instance.clone());
        Ok(instance)
    }

    fn get_resource_instance(&self, id: InstanceId) -> StorageResult<Option<ResourceInstance>> {
        Ok(self.read()?.resource_instances.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaform_core::{Cardinality, ErrorKind, ResourceKind, ResourcePayload};

    fn pump_schema() -> EntitySchema {
        let mut schema = EntitySchema::named("Pump").unwrap();
        schema
            .add_properties(vec![
                PropertySchema::short_text("tag").unwrap(),
                PropertySchema::integer("rpm").unwrap().nullable(),
            ])
            .unwrap();
        schema
    }

    fn site_schema() -> EntitySchema {
        let mut schema = EntitySchema::named("Site").unwrap();
        schema.add_property(PropertySchema::short_text("code").unwrap());
        schema
    }

    fn pump(store: &MemoryStore, schema: &EntitySchema, tag: &str) -> EntityInstance {
        let mut instance = EntityInstance::new(tag, schema).unwrap();
        instance.set_value(schema, "tag", tag).unwrap();
        store.save_entity_instance(instance).unwrap()
    }

    fn site(store: &MemoryStore, schema: &EntitySchema, code: &str) -> EntityInstance {
        let mut instance = EntityInstance::new(code, schema).unwrap();
        instance.set_value(schema, "code", code).unwrap();
        store.save_entity_instance(instance).unwrap()
    }

    /// Pump and Site schemas where pumps are located at one site
    fn linked_schemas(store: &MemoryStore, cardinality: Cardinality) -> (EntitySchema, EntitySchema) {
        let site = store.save_entity_schema(site_schema()).unwrap();
        let mut pump = store.save_entity_schema(pump_schema()).unwrap();
        let edge = pump.relate_to(&site, cardinality).unwrap();
        pump.add_relationship(edge).unwrap();
        let pump = store.save_entity_schema(pump).unwrap();
        (pump, site)
    }

    #[test]
    fn test_save_assigns_ids() {
        let store = MemoryStore::new();

        let schema = store.save_entity_schema(pump_schema()).unwrap();
        assert!(schema.id().is_persisted());
        assert!(schema.properties().iter().all(|p| p.is_persisted()));
        assert_ne!(schema.properties()[0].id(), schema.properties()[1].id());

        let stored = store.get_property(schema.properties()[0].id()).unwrap().unwrap();
        assert_eq!(stored.name(), "tag");

        let other = store.save_entity_schema(site_schema()).unwrap();
        assert!(other.id() > schema.id());
        assert_eq!(store.list_entity_schemas().unwrap().len(), 2);
    }

    #[test]
    fn test_explicit_ids_are_reserved() {
        let store = MemoryStore::new();

        let schema = store
            .save_entity_schema(pump_schema().with_id(SchemaId::new(40)))
            .unwrap();
        assert_eq!(schema.id(), SchemaId::new(40));

        let next = store.save_entity_schema(site_schema()).unwrap();
        assert_eq!(next.id(), SchemaId::new(41));
    }

    #[test]
    fn test_resave_replaces_record() {
        let store = MemoryStore::new();

        let mut schema = store.save_entity_schema(pump_schema()).unwrap();
        schema.add_property(PropertySchema::boolean("active").unwrap().nullable());
        let schema = store.save_entity_schema(schema).unwrap();

        let stored = store.get_entity_schema(schema.id()).unwrap().unwrap();
        assert_eq!(stored.properties().len(), 3);
        assert!(stored.properties()[2].is_persisted());
        assert_eq!(store.list_entity_schemas().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_display_name() {
        let store = MemoryStore::new();
        store.save_entity_schema(pump_schema()).unwrap();

        let result = store.save_entity_schema(pump_schema());
        assert!(matches!(result, Err(StorageError::DuplicateSchema(name)) if name == "Pump"));
    }

    #[test]
    fn test_find_entity_schema() {
        let store = MemoryStore::new();
        let saved = store.save_entity_schema(pump_schema()).unwrap();

        let found = store.find_entity_schema("Pump").unwrap().unwrap();
        assert_eq!(found.id(), saved.id());
        assert!(store.find_entity_schema("Valve").unwrap().is_none());
    }

    #[test]
    fn test_relationship_target_must_exist() {
        let store = MemoryStore::new();
        let mut schema = store.save_entity_schema(pump_schema()).unwrap();
        let missing = site_schema().with_id(SchemaId::new(99));
        let edge = schema.relate_to(&missing, Cardinality::ManyToOne).unwrap();
        schema.add_relationship(edge).unwrap();

        let result = store.save_entity_schema(schema);
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_self_referencing_schema() {
        let store = MemoryStore::new();
        let mut schema = store.save_entity_schema(pump_schema()).unwrap();
        let edge = schema.relate_to(&schema, Cardinality::OneToMany).unwrap();
        schema.add_relationship(edge).unwrap();

        let schema = store.save_entity_schema(schema).unwrap();
        assert!(schema.relationships()[0].is_self_referencing());
        assert!(schema.relationships()[0].id().is_persisted());

        let targets = store.resolve_targets(&schema).unwrap();
        assert_eq!(targets[0].id(), schema.id());
    }

    #[test]
    fn test_instance_must_conform() {
        let store = MemoryStore::new();
        let schema = store.save_entity_schema(pump_schema()).unwrap();

        let missing_tag = EntityInstance::new("P-1", &schema).unwrap();
        let result = store.save_entity_instance(missing_tag);
        match result {
            Err(StorageError::Model(e)) => assert_eq!(e.kind(), ErrorKind::MissingRequiredValue),
            other => panic!("expected model error, got {:?}", other),
        }

        let saved = pump(&store, &schema, "P-1");
        assert!(saved.id().is_persisted());
        assert!(store.check_instance(saved.id()).is_ok());
        assert_eq!(store.list_entity_instances(schema.id()).unwrap().len(), 1);
    }

    #[test]
    fn test_instance_schema_must_exist() {
        let store = MemoryStore::new();
        let schema = pump_schema().with_id(SchemaId::new(3));
        let instance = EntityInstance::new("P-1", &schema).unwrap();

        let result = store.save_entity_instance(instance);
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_undeclared_instance_relationship() {
        let store = MemoryStore::new();
        let (pump_schema, site_schema) = linked_schemas(&store, Cardinality::ManyToOne);
        let north = site(&store, &site_schema, "NORTH");
        let mut p1 = pump(&store, &pump_schema, "P-1");

        let edge = p1.relate_to(&north, Cardinality::ManyToMany).unwrap();
        p1.add_relationship(edge).unwrap();
        let result = store.save_entity_instance(p1);
        assert!(matches!(result, Err(StorageError::UndeclaredRelationship(_))));
    }

    #[test]
    fn test_linked_instances_resolve() {
        let store = MemoryStore::new();
        let (pump_schema, site_schema) = linked_schemas(&store, Cardinality::ManyToOne);
        let north = site(&store, &site_schema, "NORTH");
        let mut p1 = pump(&store, &pump_schema, "P-1");
        let mut p2 = pump(&store, &pump_schema, "P-2");

        let edge = p1.relate_to(&north, Cardinality::ManyToOne).unwrap();
        p1.add_relationship(edge).unwrap();
        let p1 = store.save_entity_instance(p1).unwrap();
        assert!(p1.relationships()[0].id().is_persisted());

        // many sources may share the one target
        let edge = p2.relate_to(&north, Cardinality::ManyToOne).unwrap();
        p2.add_relationship(edge).unwrap();
        store.save_entity_instance(p2).unwrap();

        let linked = store.resolve_linked(&p1).unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].name(), "NORTH");
    }

    #[test]
    fn test_to_one_source_has_single_target() {
        let store = MemoryStore::new();
        let (pump_schema, site_schema) = linked_schemas(&store, Cardinality::ManyToOne);
        let north = site(&store, &site_schema, "NORTH");
        let south = site(&store, &site_schema, "SOUTH");
        let mut p1 = pump(&store, &pump_schema, "P-1");

        let edges = vec![
            p1.relate_to(&north, Cardinality::ManyToOne).unwrap(),
            p1.relate_to(&south, Cardinality::ManyToOne).unwrap(),
        ];
        p1.add_relationships(edges).unwrap();
        let result = store.save_entity_instance(p1);
        assert!(matches!(result, Err(StorageError::CardinalityViolation(_))));
    }

    #[test]
    fn test_one_to_one_target_has_single_source() {
        let store = MemoryStore::new();
        let (pump_schema, site_schema) = linked_schemas(&store, Cardinality::OneToOne);
        let north = site(&store, &site_schema, "NORTH");
        let mut p1 = pump(&store, &pump_schema, "P-1");
        let mut p2 = pump(&store, &pump_schema, "P-2");

        let edge = p1.relate_to(&north, Cardinality::OneToOne).unwrap();
        p1.add_relationship(edge).unwrap();
        let p1 = store.save_entity_instance(p1).unwrap();

        let edge = p2.relate_to(&north, Cardinality::OneToOne).unwrap();
        p2.add_relationship(edge).unwrap();
        let result = store.save_entity_instance(p2);
        assert!(matches!(result, Err(StorageError::CardinalityViolation(_))));

        // re-saving the current holder is not a conflict with itself
        assert!(store.save_entity_instance(p1).is_ok());
    }

    #[test]
    fn test_resource_schema_and_instance() {
        let store = MemoryStore::new();
        let picture = store
            .save_property(PropertySchema::resource("picture", ResourceKind::Image).unwrap())
            .unwrap();
        let mut schema = ResourceSchema::new(
            ResourceKind::Image,
            "Site photo".try_into().unwrap(),
            "SitePhoto".try_into().unwrap(),
            picture,
        )
        .unwrap();
        schema.add_property(PropertySchema::long_text("caption", 200).unwrap().nullable());
        let schema = store.save_resource_schema(schema).unwrap();
        assert!(schema.object().properties()[0].is_persisted());

        let instance = ResourceInstance::from_payload(
            "front",
            &schema,
            ResourcePayload::new("front.png", vec![1, 2, 3]),
        )
        .unwrap();
        let instance = store.save_resource_instance(instance).unwrap();

        let stored = store.get_resource_instance(instance.id()).unwrap().unwrap();
        assert_eq!(stored.payload().map(|p| p.len()), Some(3));
        assert_eq!(store.dependents_of(schema.id()).unwrap(), vec![instance.id()]);
    }

    #[test]
    fn test_schema_id_conflict_between_families() {
        let store = MemoryStore::new();
        let entity = store.save_entity_schema(pump_schema()).unwrap();

        let picture = store
            .save_property(PropertySchema::resource("picture", ResourceKind::Image).unwrap())
            .unwrap();
        let schema = ResourceSchema::new(
            ResourceKind::Image,
            "Site photo".try_into().unwrap(),
            "SitePhoto".try_into().unwrap(),
            picture,
        )
        .unwrap()
        .with_id(entity.id());

        let result = store.save_resource_schema(schema);
        assert!(matches!(result, Err(StorageError::IdConflict(_))));
    }

    #[test]
    fn test_property_id_held_by_another_schema() {
        let store = MemoryStore::new();
        let mut first = EntitySchema::named("Tank").unwrap();
        first.add_property(
            PropertySchema::short_text("code")
                .unwrap()
                .with_id(PropertyId::new(1)),
        );
        store.save_entity_schema(first).unwrap();

        let mut second = EntitySchema::named("Meter").unwrap();
        second.add_property(
            PropertySchema::integer("count")
                .unwrap()
                .with_id(PropertyId::new(1)),
        );
        let result = store.save_entity_schema(second);
        assert!(matches!(result, Err(StorageError::IdConflict(_))));
        assert!(store.find_entity_schema("Meter").unwrap().is_none());

        let stored = store.get_property(PropertyId::new(1)).unwrap().unwrap();
        assert_eq!(stored.name(), "code");
    }

    #[test]
    fn test_property_id_reused_as_different_property() {
        let store = MemoryStore::new();
        let saved = store
            .save_property(PropertySchema::short_text("code").unwrap())
            .unwrap();

        let impostor = PropertySchema::integer("count").unwrap().with_id(saved.id());
        let result = store.save_property(impostor);
        assert!(matches!(result, Err(StorageError::IdConflict(_))));

        let resaved = store.save_property(saved.clone()).unwrap();
        assert_eq!(resaved.id(), saved.id());
    }

    #[test]
    fn test_property_id_given_twice_in_one_schema() {
        let store = MemoryStore::new();
        let mut schema = EntitySchema::named("Tank").unwrap();
        schema
            .add_properties(vec![
                PropertySchema::short_text("code")
                    .unwrap()
                    .with_id(PropertyId::new(4)),
                PropertySchema::short_text("label")
                    .unwrap()
                    .with_id(PropertyId::new(4)),
            ])
            .unwrap();

        let result = store.save_entity_schema(schema);
        assert!(matches!(result, Err(StorageError::IdConflict(_))));
    }
}
