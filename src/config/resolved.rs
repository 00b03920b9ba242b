//! Resolved registry: config validated and flattened for runtime use.

use crate::config::validator::SERVER_FIELDS;
use crate::config::{validate, FieldKind, RegistryConfig};
use crate::error::{AppError, ConfigError};
use crate::hooks::HookSet;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
}

/// Table metadata for one entity. Field names form the only identifiers ever
/// interpolated into SQL for this entity.
#[derive(Clone, Debug)]
pub struct EntityDescriptor {
    pub key: String,
    pub schema_name: Option<String>,
    pub table_name: String,
    /// `id` first; always contains created_at, updated_at, deleted_at.
    pub fields: Vec<Field>,
    pub searchable: Vec<String>,
}

impl EntityDescriptor {
    pub fn id_kind(&self) -> FieldKind {
        self.fields[0].kind
    }

    /// Fields a request body may set, in descriptor order.
    pub fn writable_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter(|f| !SERVER_FIELDS.contains(&f.name.as_str()))
    }
}

/// Descriptor plus the hooks that guard its mutations.
pub struct RegisteredEntity {
    pub descriptor: EntityDescriptor,
    pub hooks: HookSet,
}

/// Process-wide entity table, built once at startup and shared read-only.
pub struct Registry {
    entities: HashMap<String, RegisteredEntity>,
}

impl Registry {
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        validate(config)?;
        let mut entities = HashMap::new();
        for e in &config.entities {
            let descriptor = EntityDescriptor {
                key: e.key.clone(),
                schema_name: e.schema.clone(),
                table_name: e.table_name.clone(),
                fields: e
                    .fields
                    .iter()
                    .map(|f| Field {
                        name: f.name.clone(),
                        kind: f.kind,
                    })
                    .collect(),
                searchable: e.searchable.clone(),
            };
            let hooks = HookSet::from_rules(&e.validation).map_err(|m| ConfigError::InvalidEntity {
                entity: e.key.clone(),
                message: m,
            })?;
            entities.insert(e.key.clone(), RegisteredEntity { descriptor, hooks });
        }
        Ok(Registry { entities })
    }

    /// Append programmatic hooks for an entity; they run after its rule hooks.
    pub fn add_hooks(&mut self, key: &str, hooks: HookSet) -> Result<(), ConfigError> {
        let entry = self
            .entities
            .get_mut(key)
            .ok_or_else(|| ConfigError::UnknownEntity(key.to_string()))?;
        let existing = std::mem::take(&mut entry.hooks);
        entry.hooks = existing.chain(hooks);
        Ok(())
    }

    pub fn resolve(&self, key: &str) -> Result<&RegisteredEntity, AppError> {
        self.entities
            .get(key)
            .ok_or_else(|| AppError::NotFound(format!("unknown entity '{}'", key)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }
}
