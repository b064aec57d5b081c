//! Settings read through the `config` crate: an optional `dynafinder.{json,toml,yaml}`
//! file overlaid with `DYNAFINDER__*` environment variables.

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::entity::PersistentEntity;
use crate::error::Result;
use crate::family::FAMILY_NAMES;
use crate::value::ValueType;

pub const DEFAULT_SETTINGS_FILE: &str = "dynafinder";
pub const ENVIRONMENT_PREFIX: &str = "DYNAFINDER";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FinderSettings {
    pub log_filter: String,
    /// Boolean operators, tried in order when splitting a query sequence.
    pub operators: Vec<String>,
    /// Enabled finder families, in dispatch order.
    pub families: Vec<String>,
    pub entities: Vec<EntityDefinition>,
}

impl Default for FinderSettings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            operators: vec!["And".to_string(), "Or".to_string()],
            families: FAMILY_NAMES.iter().map(|f| f.to_string()).collect(),
            entities: Vec::new(),
        }
    }
}

impl FinderSettings {
    /// Loads the given file, or `dynafinder.*` from the working directory if
    /// present, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };
        let settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENVIRONMENT_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("operators")
                    .with_list_parse_key("families"),
            )
            .build()?;
        Ok(settings.try_deserialize::<FinderSettings>()?)
    }
}

// ------------- Entity Definitions -------------
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntityDefinition {
    pub name: String,
    #[serde(default)]
    pub identity: Option<PropertyDefinition>,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    /// A basic type name (`Long`, `String`, ...) or the name of an associated entity.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Only meaningful for associations: a to-many association.
    #[serde(default)]
    pub many: bool,
}

impl EntityDefinition {
    pub fn to_entity(&self) -> PersistentEntity {
        let mut entity = PersistentEntity::new(&self.name);
        if let Some(identity) = &self.identity {
            entity = entity.with_identity(&identity.name, ValueType::from_name(&identity.type_name));
        }
        for property in &self.properties {
            entity = match ValueType::from_name(&property.type_name) {
                ValueType::Entity(target) if property.many => entity.to_many(&property.name, &target),
                ValueType::Entity(target) => entity.to_one(&property.name, &target),
                other => entity.property(&property.name, other),
            };
        }
        entity
    }
}
