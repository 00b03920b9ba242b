//! Raw registry config types matching the JSON registry file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Declared kind of a column. Drives parameter casts, body coercion and row scanning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Integer,
    Numeric,
    Text,
    Boolean,
    Date,
    Timestamp,
    Uuid,
}

impl FieldKind {
    /// PostgreSQL type used when casting a bound parameter.
    pub fn bind_cast(self) -> &'static str {
        match self {
            FieldKind::Integer => "bigint",
            FieldKind::Numeric => "numeric",
            FieldKind::Text => "text",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::Timestamp => "timestamptz",
            FieldKind::Uuid => "uuid",
        }
    }

    /// PostgreSQL type used in select lists so every kind scans into one Rust type.
    pub fn select_cast(self) -> &'static str {
        match self {
            FieldKind::Integer => "bigint",
            FieldKind::Numeric | FieldKind::Text | FieldKind::Date | FieldKind::Uuid => "text",
            FieldKind::Boolean => "boolean",
            FieldKind::Timestamp => "timestamptz",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub kind: FieldKind,
}

/// Per-field validation rule compiled into the entity's hooks.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    /// `email` or `date` (YYYY-MM-DD).
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityConfig {
    /// URL path segment, e.g. `customer` in `/customer/12`.
    pub key: String,
    #[serde(default)]
    pub schema: Option<String>,
    pub table_name: String,
    /// Ordered column list; `id` first, timestamps included.
    pub fields: Vec<FieldConfig>,
    /// Text fields matched by the `q` search parameter.
    #[serde(default)]
    pub searchable: Vec<String>,
    #[serde(default)]
    pub validation: HashMap<String, ValidationRule>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub entities: Vec<EntityConfig>,
}
