//! Builds parameterized SELECT, INSERT, UPDATE for one entity descriptor.
//! Identifiers come from the registry only; values are always parameters.

use crate::config::{EntityDescriptor, FieldKind};
use crate::error::AppError;
use crate::pagination::{like_pattern, Pagination};
use crate::record::{EntityId, Record, Scalar};

/// Quote identifier for PostgreSQL (safe: only from registry).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Table name, schema-qualified when the entity declares a schema.
fn qualified_table(entity: &EntityDescriptor) -> String {
    match &entity.schema_name {
        Some(schema) => format!("{}.{}", quoted(schema), quoted(&entity.table_name)),
        None => quoted(&entity.table_name),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Scalar>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a value and return its placeholder with the cast for `kind`.
    fn push_param(&mut self, v: Scalar, kind: FieldKind) -> String {
        self.params.push(v);
        format!("${}::{}", self.params.len(), kind.bind_cast())
    }
}

/// Page query plus the companion count over the same filter.
#[derive(Clone, Debug, PartialEq)]
pub struct ListStatements {
    pub page: QueryBuf,
    pub count: QueryBuf,
}

/// SELECT list in descriptor order, each column cast so it scans into one Rust type.
fn select_column_list(entity: &EntityDescriptor) -> String {
    entity
        .fields
        .iter()
        .map(|f| {
            let q = quoted(&f.name);
            format!("{}::{} AS {}", q, f.kind.select_cast(), q)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn id_filter(q: &mut QueryBuf, entity: &EntityDescriptor, id: &EntityId) -> String {
    let ph = q.push_param(id.to_scalar(), entity.id_kind());
    format!("{} = {}", quoted("id"), ph)
}

fn active() -> String {
    format!("{} IS NULL", quoted("deleted_at"))
}

/// SELECT one active row by id.
pub fn build_get_one(entity: &EntityDescriptor, id: &EntityId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let filter = id_filter(&mut q, entity, id);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} AND {}",
        select_column_list(entity),
        qualified_table(entity),
        filter,
        active()
    );
    q
}

/// WHERE clause shared by the page and count statements.
fn list_filter(q: &mut QueryBuf, entity: &EntityDescriptor, search: Option<&str>) -> String {
    let mut clause = format!(" WHERE {}", active());
    if let Some(term) = search {
        if !entity.searchable.is_empty() {
            let ph = q.push_param(Scalar::Text(like_pattern(term)), FieldKind::Text);
            let ors = entity
                .searchable
                .iter()
                .map(|f| format!("{} ILIKE {}", quoted(f), ph))
                .collect::<Vec<_>>()
                .join(" OR ");
            clause.push_str(&format!(" AND ({})", ors));
        }
    }
    clause
}

/// Paged SELECT of active rows ordered by id, with an optional
/// case-insensitive substring search across the searchable fields.
pub fn build_get_list(entity: &EntityDescriptor, pagination: &Pagination, search: Option<&str>) -> ListStatements {
    let table = qualified_table(entity);

    let mut count = QueryBuf::new();
    let where_clause = list_filter(&mut count, entity, search);
    count.sql = format!("SELECT COUNT(*) FROM {}{}", table, where_clause);

    let mut page = QueryBuf::new();
    let where_clause = list_filter(&mut page, entity, search);
    let limit = page.push_param(Scalar::Int(pagination.limit as i64), FieldKind::Integer);
    let offset = page.push_param(Scalar::Int(pagination.offset()), FieldKind::Integer);
    page.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {} LIMIT {} OFFSET {}",
        select_column_list(entity),
        table,
        where_clause,
        quoted("id"),
        limit,
        offset
    );
    ListStatements { page, count }
}

/// INSERT with only the writable fields the caller supplied; omitted columns
/// take their defaults. Timestamps are stamped by the store clock.
pub fn build_create(entity: &EntityDescriptor, record: &Record) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut values = Vec::new();
    for f in entity.writable_fields() {
        if let Some(v) = record.get(&f.name) {
            values.push(q.push_param(v.clone(), f.kind));
            cols.push(quoted(&f.name));
        }
    }
    for ts in ["created_at", "updated_at"] {
        cols.push(quoted(ts));
        values.push("NOW()".to_string());
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        qualified_table(entity),
        cols.join(", "),
        values.join(", "),
        select_column_list(entity)
    );
    q
}

/// UPDATE of an active row: SET only the writable fields present, plus updated_at.
pub fn build_update(entity: &EntityDescriptor, id: &EntityId, record: &Record) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for f in entity.writable_fields() {
        if let Some(v) = record.get(&f.name) {
            let ph = q.push_param(v.clone(), f.kind);
            sets.push(format!("{} = {}", quoted(&f.name), ph));
        }
    }
    if sets.is_empty() {
        return Err(AppError::Validation("no updatable fields provided".into()));
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let filter = id_filter(&mut q, entity, id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} AND {} RETURNING {}",
        qualified_table(entity),
        sets.join(", "),
        filter,
        active(),
        select_column_list(entity)
    );
    Ok(q)
}

/// Mark an active row deleted. Zero rows affected means not found.
pub fn build_soft_delete(entity: &EntityDescriptor, id: &EntityId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let filter = id_filter(&mut q, entity, id);
    q.sql = format!(
        "UPDATE {} SET {} = NOW() WHERE {} AND {}",
        qualified_table(entity),
        quoted("deleted_at"),
        filter,
        active()
    );
    q
}

/// Clear deleted_at. Not scoped to deleted rows, so restoring an active row is a no-op success.
pub fn build_restore(entity: &EntityDescriptor, id: &EntityId) -> QueryBuf {
    let mut q = QueryBuf::new();
    let filter = id_filter(&mut q, entity, id);
    q.sql = format!(
        "UPDATE {} SET {} = NULL WHERE {} RETURNING {}",
        qualified_table(entity),
        quoted("deleted_at"),
        filter,
        select_column_list(entity)
    );
    q
}
