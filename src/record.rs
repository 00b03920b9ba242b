//! Dynamically typed row values used at the store boundary.

use crate::config::{EntityDescriptor, FieldKind};
use crate::error::AppError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Number, Value};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    /// Decimal text exactly as PostgreSQL or the request wrote it.
    Decimal(String),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Decimal(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Int(n) => Value::Number((*n).into()),
            Scalar::Decimal(s) => s
                .parse::<Number>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(s.clone())),
            Scalar::Text(s) => Value::String(s.clone()),
            Scalar::Timestamp(t) => Value::String(t.to_rfc3339()),
        }
    }

    /// Coerce a JSON body value into the scalar the field kind expects.
    fn from_json(field: &str, kind: FieldKind, v: &Value) -> Result<Self, AppError> {
        let mismatch = |expected: &str| AppError::BadRequest(format!("{} must be {}", field, expected));
        if v.is_null() {
            return Ok(Scalar::Null);
        }
        Ok(match kind {
            FieldKind::Integer => Scalar::Int(v.as_i64().ok_or_else(|| mismatch("an integer"))?),
            FieldKind::Numeric => match v {
                Value::Number(n) => Scalar::Decimal(n.to_string()),
                _ => return Err(mismatch("a number")),
            },
            FieldKind::Text => Scalar::Text(v.as_str().ok_or_else(|| mismatch("a string"))?.to_string()),
            FieldKind::Boolean => Scalar::Bool(v.as_bool().ok_or_else(|| mismatch("a boolean"))?),
            FieldKind::Date => {
                let s = v.as_str().ok_or_else(|| mismatch("a date (YYYY-MM-DD)"))?;
                NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| mismatch("a date (YYYY-MM-DD)"))?;
                Scalar::Text(s.to_string())
            }
            FieldKind::Timestamp => {
                let s = v.as_str().ok_or_else(|| mismatch("an RFC 3339 timestamp"))?;
                let t = DateTime::parse_from_rfc3339(s).map_err(|_| mismatch("an RFC 3339 timestamp"))?;
                Scalar::Timestamp(t.with_timezone(&Utc))
            }
            FieldKind::Uuid => {
                let s = v.as_str().ok_or_else(|| mismatch("a uuid"))?;
                let u = uuid::Uuid::parse_str(s).map_err(|_| mismatch("a uuid"))?;
                Scalar::Text(u.to_string())
            }
        })
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null => serializer.serialize_none(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Int(n) => serializer.serialize_i64(*n),
            // NaN and Infinity have no JSON number form.
            Scalar::Decimal(s) => match s.parse::<Number>() {
                Ok(n) => n.serialize(serializer),
                Err(_) => serializer.serialize_str(s),
            },
            Scalar::Text(s) => serializer.serialize_str(s),
            Scalar::Timestamp(t) => serializer.serialize_str(&t.to_rfc3339()),
        }
    }
}

/// Field-keyed values in descriptor order. Lives for one request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Scalar)>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Scalar) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: Scalar) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build a partial record from a request body. Keeps only writable fields,
    /// in descriptor order; unknown and server-controlled keys are dropped.
    pub fn from_body(entity: &EntityDescriptor, body: &Value) -> Result<Self, AppError> {
        let obj = body
            .as_object()
            .ok_or_else(|| AppError::BadRequest("body must be a JSON object".into()))?;
        let mut record = Record::new();
        for field in entity.writable_fields() {
            if let Some(v) = obj.get(&field.name) {
                record.insert(field.name.clone(), Scalar::from_json(&field.name, field.kind, v)?);
            }
        }
        Ok(record)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Path id parsed according to the entity's id kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityId {
    Int(i64),
    Uuid(uuid::Uuid),
}

impl EntityId {
    pub fn parse(kind: FieldKind, raw: &str) -> Result<Self, AppError> {
        let invalid = || AppError::BadRequest(format!("invalid id '{}'", raw));
        match kind {
            FieldKind::Uuid => uuid::Uuid::parse_str(raw).map(EntityId::Uuid).map_err(|_| invalid()),
            _ => match raw.parse::<i64>() {
                Ok(n) if n > 0 => Ok(EntityId::Int(n)),
                _ => Err(invalid()),
            },
        }
    }

    pub fn to_scalar(&self) -> Scalar {
        match self {
            EntityId::Int(n) => Scalar::Int(*n),
            EntityId::Uuid(u) => Scalar::Text(u.to_string()),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(n) => write!(f, "{}", n),
            EntityId::Uuid(u) => write!(f, "{}", u),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{builtin_config, Registry};
    use serde_json::json;

    fn produk() -> EntityDescriptor {
        let registry = Registry::from_config(&builtin_config()).unwrap();
        registry.resolve("produk").unwrap().descriptor.clone()
    }

    #[test]
    fn body_drops_unknown_and_server_fields() {
        let body = json!({
            "id": 99,
            "created_at": "2020-01-01T00:00:00Z",
            "deleted_at": null,
            "nama": "Kopi",
            "warna": "hitam",
            "kode": "P1"
        });
        let record = Record::from_body(&produk(), &body).unwrap();
        let keys: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["kode", "nama"]);
    }

    #[test]
    fn body_coerces_by_kind() {
        let body = json!({"harga": 12.5, "stok": 3, "aktif": true, "satuan": null});
        let record = Record::from_body(&produk(), &body).unwrap();
        assert_eq!(record.get("harga"), Some(&Scalar::Decimal("12.5".into())));
        assert_eq!(record.get("stok"), Some(&Scalar::Int(3)));
        assert_eq!(record.get("aktif"), Some(&Scalar::Bool(true)));
        assert_eq!(record.get("satuan"), Some(&Scalar::Null));
    }

    #[test]
    fn wide_decimal_keeps_every_digit() {
        let body: Value = serde_json::from_str(r#"{"harga": 12345678901234567.89}"#).unwrap();
        let record = Record::from_body(&produk(), &body).unwrap();
        assert_eq!(record.get("harga"), Some(&Scalar::Decimal("12345678901234567.89".into())));
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"harga":12345678901234567.89}"#);

        let odd = Record::new().with("harga", Scalar::Decimal("NaN".into()));
        assert_eq!(serde_json::to_string(&odd).unwrap(), r#"{"harga":"NaN"}"#);
    }

    #[test]
    fn body_type_mismatch_is_bad_request() {
        let err = Record::from_body(&produk(), &json!({"stok": "banyak"})).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(m) if m.contains("stok")));
        let err = Record::from_body(&produk(), &json!({"harga": "mahal"})).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(m) if m.contains("harga")));
        let err = Record::from_body(&produk(), &json!({"nama": {"x": 1}})).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(Record::from_body(&produk(), &json!([1, 2])).is_err());
    }

    #[test]
    fn record_serializes_in_insertion_order() {
        let t = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z").unwrap().with_timezone(&Utc);
        let record = Record::new()
            .with("id", Scalar::Int(1))
            .with("nama", Scalar::Text("Alice".into()))
            .with("created_at", Scalar::Timestamp(t))
            .with("deleted_at", Scalar::Null);
        let out = serde_json::to_string(&record).unwrap();
        assert_eq!(
            out,
            r#"{"id":1,"nama":"Alice","created_at":"2024-05-01T10:00:00+00:00","deleted_at":null}"#
        );
    }

    #[test]
    fn id_parsing_follows_kind() {
        assert_eq!(EntityId::parse(FieldKind::Integer, "42").unwrap(), EntityId::Int(42));
        assert!(EntityId::parse(FieldKind::Integer, "abc").is_err());
        assert!(EntityId::parse(FieldKind::Integer, "0").is_err());
        assert!(EntityId::parse(FieldKind::Integer, "-3").is_err());
        let u = "0b5e6a4c-8d0e-4c83-9c53-2f8a1d2b7e10";
        assert_eq!(EntityId::parse(FieldKind::Uuid, u).unwrap().to_string(), u);
        assert!(EntityId::parse(FieldKind::Uuid, "42").is_err());
    }
}
