use std::sync::Arc;

use core::hash::BuildHasherDefault;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use seahash::SeaHasher;

use crate::error::{FinderError, Result};
use crate::settings::EntityDefinition;
use crate::value::ValueType;

pub type NameHasher = BuildHasherDefault<SeaHasher>;

pub const DEFAULT_IDENTITY: &str = "id";

// ------------- Property -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Identity,
    Basic,
    ToOne,
    ToMany,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentProperty {
    name: String,
    value_type: ValueType,
    kind: PropertyKind,
}

impl PersistentProperty {
    pub fn new(name: &str, value_type: ValueType, kind: PropertyKind) -> Self {
        Self {
            name: name.to_string(),
            value_type,
            kind,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }
    /// Basic properties are directly storable, as opposed to associations.
    pub fn is_basic(&self) -> bool {
        matches!(self.kind, PropertyKind::Identity | PropertyKind::Basic)
    }
}

// ------------- Entity -------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentEntity {
    name: String,
    identity: PersistentProperty,
    properties: Vec<PersistentProperty>,
}

impl PersistentEntity {
    /// Creates an entity with a `Long` identity named `id`.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            identity: PersistentProperty::new(DEFAULT_IDENTITY, ValueType::Long, PropertyKind::Identity),
            properties: Vec::new(),
        }
    }
    pub fn with_identity(mut self, name: &str, value_type: ValueType) -> Self {
        self.identity = PersistentProperty::new(name, value_type, PropertyKind::Identity);
        self
    }
    pub fn property(mut self, name: &str, value_type: ValueType) -> Self {
        self.properties.push(PersistentProperty::new(name, value_type, PropertyKind::Basic));
        self
    }
    pub fn to_one(mut self, name: &str, target: &str) -> Self {
        self.properties.push(PersistentProperty::new(
            name,
            ValueType::Entity(target.to_string()),
            PropertyKind::ToOne,
        ));
        self
    }
    pub fn to_many(mut self, name: &str, target: &str) -> Self {
        self.properties.push(PersistentProperty::new(
            name,
            ValueType::Entity(target.to_string()),
            PropertyKind::ToMany,
        ));
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn identity(&self) -> &PersistentProperty {
        &self.identity
    }
    pub fn properties(&self) -> &[PersistentProperty] {
        &self.properties
    }
    /// Looks up a property, falling back to the identity.
    pub fn property_by_name(&self, name: &str) -> Option<&PersistentProperty> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .or_else(|| (self.identity.name == name).then_some(&self.identity))
    }
}

// ------------- Mapping Context -------------
// Keeps one entity per name, shared through Arc with every invocation.
#[derive(Debug, Default)]
pub struct MappingContext {
    kept: HashMap<String, Arc<PersistentEntity>, NameHasher>,
}

impl MappingContext {
    pub fn new() -> Self {
        Self {
            kept: HashMap::default(),
        }
    }
    pub fn from_definitions(definitions: &[EntityDefinition]) -> Result<Self> {
        let mut context = Self::new();
        for definition in definitions {
            let (_, previously_kept) = context.keep(definition.to_entity());
            if previously_kept {
                return Err(FinderError::IllegalConfiguration(format!(
                    "Entity {} is defined more than once",
                    definition.name
                )));
            }
        }
        Ok(context)
    }
    pub fn keep(&mut self, entity: PersistentEntity) -> (Arc<PersistentEntity>, bool) {
        match self.kept.entry(entity.name().to_string()) {
            Entry::Occupied(e) => (Arc::clone(e.get()), true),
            Entry::Vacant(e) => (Arc::clone(e.insert(Arc::new(entity))), false),
        }
    }
    pub fn entity(&self, name: &str) -> Option<Arc<PersistentEntity>> {
        self.kept.get(name).map(Arc::clone)
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}
