//! Registry validation: identifier safety and descriptor shape.

use crate::config::{EntityConfig, FieldKind, RegistryConfig};
use crate::error::ConfigError;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Columns the server controls; never written from a request body.
pub const SERVER_FIELDS: [&str; 4] = ["id", "created_at", "updated_at", "deleted_at"];

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"))
}

fn key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("static regex"))
}

fn check_identifier(kind: &'static str, name: &str) -> Result<(), ConfigError> {
    if identifier_re().is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidIdentifier {
            kind,
            name: name.to_string(),
        })
    }
}

pub fn validate(config: &RegistryConfig) -> Result<(), ConfigError> {
    let mut keys = HashSet::new();
    for entity in &config.entities {
        if !key_re().is_match(&entity.key) {
            return Err(ConfigError::InvalidIdentifier {
                kind: "entity key",
                name: entity.key.clone(),
            });
        }
        if !keys.insert(entity.key.as_str()) {
            return Err(ConfigError::DuplicateEntity(entity.key.clone()));
        }
        validate_entity(entity)?;
    }
    Ok(())
}

fn invalid(entity: &EntityConfig, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEntity {
        entity: entity.key.clone(),
        message: message.into(),
    }
}

fn validate_entity(entity: &EntityConfig) -> Result<(), ConfigError> {
    if let Some(schema) = &entity.schema {
        check_identifier("schema", schema)?;
    }
    check_identifier("table", &entity.table_name)?;

    let first = entity
        .fields
        .first()
        .ok_or_else(|| invalid(entity, "fields must not be empty"))?;
    if first.name != "id" {
        return Err(invalid(entity, "first field must be id"));
    }
    if !matches!(first.kind, FieldKind::Integer | FieldKind::Uuid) {
        return Err(invalid(entity, "id must be integer or uuid"));
    }

    let mut names = HashSet::new();
    for f in &entity.fields {
        check_identifier("field", &f.name)?;
        if !names.insert(f.name.as_str()) {
            return Err(invalid(entity, format!("duplicate field {}", f.name)));
        }
    }

    for ts in ["created_at", "updated_at", "deleted_at"] {
        match entity.fields.iter().find(|f| f.name == ts) {
            Some(f) if f.kind == FieldKind::Timestamp => {}
            Some(_) => return Err(invalid(entity, format!("{} must be a timestamp", ts))),
            None => return Err(invalid(entity, format!("missing field {}", ts))),
        }
    }

    for s in &entity.searchable {
        match entity.fields.iter().find(|f| &f.name == s) {
            Some(f) if f.kind == FieldKind::Text => {}
            Some(_) => return Err(invalid(entity, format!("searchable field {} is not text", s))),
            None => return Err(invalid(entity, format!("unknown searchable field {}", s))),
        }
    }

    for (col, rule) in &entity.validation {
        if SERVER_FIELDS.contains(&col.as_str()) || !names.contains(col.as_str()) {
            return Err(invalid(entity, format!("validation for non-writable field {}", col)));
        }
        if let Some(format) = &rule.format {
            if !matches!(format.to_lowercase().as_str(), "email" | "date") {
                return Err(invalid(entity, format!("unknown format {} for {}", format, col)));
            }
        }
        if let Some(pattern) = &rule.pattern {
            Regex::new(pattern).map_err(|_| invalid(entity, format!("invalid pattern for {}", col)))?;
        }
    }
    Ok(())
}
