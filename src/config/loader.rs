//! Registry sources: the built-in master tables or a JSON file.

use crate::config::{EntityConfig, FieldConfig, FieldKind, RegistryConfig, ValidationRule};
use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

/// Read a `RegistryConfig` from a JSON file.
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<RegistryConfig, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw).map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))
}

/// Wraps business fields with the standard id and lifecycle timestamp columns.
fn master_table(
    key: &str,
    table_name: &str,
    business: &[(&str, FieldKind)],
    searchable: &[&str],
    validation: HashMap<String, ValidationRule>,
) -> EntityConfig {
    let mut fields = vec![FieldConfig {
        name: "id".into(),
        kind: FieldKind::Integer,
    }];
    fields.extend(business.iter().map(|(name, kind)| FieldConfig {
        name: (*name).into(),
        kind: *kind,
    }));
    for ts in ["created_at", "updated_at", "deleted_at"] {
        fields.push(FieldConfig {
            name: ts.into(),
            kind: FieldKind::Timestamp,
        });
    }
    EntityConfig {
        key: key.into(),
        schema: None,
        table_name: table_name.into(),
        fields,
        searchable: searchable.iter().map(|s| (*s).into()).collect(),
        validation,
    }
}

fn required() -> ValidationRule {
    ValidationRule {
        required: Some(true),
        ..Default::default()
    }
}

/// Built-in registry: users, customer and produk master tables.
pub fn builtin_config() -> RegistryConfig {
    let users = master_table(
        "users",
        "user_pengguna",
        &[
            ("kode", FieldKind::Text),
            ("nama", FieldKind::Text),
            ("tanggal_lahir", FieldKind::Date),
            ("lokasi", FieldKind::Text),
            ("email", FieldKind::Text),
        ],
        &["kode", "nama", "email"],
        HashMap::from([
            ("kode".to_string(), required()),
            (
                "nama".to_string(),
                ValidationRule {
                    required: Some(true),
                    min_length: Some(3),
                    ..Default::default()
                },
            ),
            (
                "email".to_string(),
                ValidationRule {
                    required: Some(true),
                    format: Some("email".into()),
                    ..Default::default()
                },
            ),
            (
                "tanggal_lahir".to_string(),
                ValidationRule {
                    required: Some(true),
                    format: Some("date".into()),
                    ..Default::default()
                },
            ),
        ]),
    );

    let customer = master_table(
        "customer",
        "customer",
        &[
            ("kode", FieldKind::Text),
            ("nama", FieldKind::Text),
            ("alamat", FieldKind::Text),
            ("telepon", FieldKind::Text),
            ("email", FieldKind::Text),
        ],
        &["kode", "nama", "alamat", "email"],
        HashMap::from([
            ("kode".to_string(), required()),
            ("nama".to_string(), required()),
            (
                "email".to_string(),
                ValidationRule {
                    format: Some("email".into()),
                    ..Default::default()
                },
            ),
        ]),
    );

    let produk = master_table(
        "produk",
        "produk",
        &[
            ("kode", FieldKind::Text),
            ("nama", FieldKind::Text),
            ("satuan", FieldKind::Text),
            ("harga", FieldKind::Numeric),
            ("stok", FieldKind::Integer),
            ("aktif", FieldKind::Boolean),
        ],
        &["kode", "nama"],
        HashMap::from([
            ("kode".to_string(), required()),
            ("nama".to_string(), required()),
            (
                "harga".to_string(),
                ValidationRule {
                    minimum: Some(0.0),
                    ..Default::default()
                },
            ),
            (
                "stok".to_string(),
                ValidationRule {
                    minimum: Some(0.0),
                    ..Default::default()
                },
            ),
        ]),
    );

    RegistryConfig {
        entities: vec![users, customer, produk],
    }
}
