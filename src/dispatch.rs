//! Request dispatch: `/{entity}/{id}?/{action}?` plus the HTTP verb resolve to
//! exactly one CRUD operation on a registered entity.

use crate::config::{RegisteredEntity, Registry};
use crate::error::AppError;
use crate::record::EntityId;
use axum::http::Method;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verb {
    Create,
    Read,
    Update,
    Delete,
}

impl Verb {
    pub fn from_method(method: &Method) -> Option<Verb> {
        match *method {
            Method::POST => Some(Verb::Create),
            Method::GET => Some(Verb::Read),
            Method::PUT | Method::PATCH => Some(Verb::Update),
            Method::DELETE => Some(Verb::Delete),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathParts<'a> {
    pub entity: &'a str,
    pub id: Option<&'a str>,
    pub action: Option<&'a str>,
}

/// Split a request path into entity, id and action. Empty segments are ignored.
pub fn parse_path(path: &str) -> Result<PathParts<'_>, AppError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments[..] {
        [entity] => Ok(PathParts {
            entity,
            id: None,
            action: None,
        }),
        [entity, id] => Ok(PathParts {
            entity,
            id: Some(id),
            action: None,
        }),
        [entity, id, action] => Ok(PathParts {
            entity,
            id: Some(id),
            action: Some(action),
        }),
        _ => Err(AppError::NotFound(format!("no route for '{}'", path))),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    GetOne(EntityId),
    GetList,
    Create,
    Update(EntityId),
    SoftDelete(EntityId),
    Restore(EntityId),
}

#[derive(Clone, Copy)]
enum Kind {
    GetOne,
    GetList,
    Create,
    Update,
    SoftDelete,
    Restore,
}

fn not_allowed(method: &Method, path: &str) -> AppError {
    AppError::MethodNotAllowed(format!("{} {}", method, path))
}

fn classify(verb: Verb, parts: &PathParts<'_>) -> Result<Option<Kind>, AppError> {
    if let Some(action) = parts.action {
        return match action {
            "restore" if verb == Verb::Update => Ok(Some(Kind::Restore)),
            "restore" => Ok(None),
            other => Err(AppError::BadRequest(format!("unknown action '{}'", other))),
        };
    }
    Ok(match (verb, parts.id.is_some()) {
        (Verb::Read, true) => Some(Kind::GetOne),
        (Verb::Read, false) => Some(Kind::GetList),
        (Verb::Create, false) => Some(Kind::Create),
        (Verb::Update, true) => Some(Kind::Update),
        (Verb::Delete, true) => Some(Kind::SoftDelete),
        _ => None,
    })
}

/// Resolve method and path to a registered entity and one operation.
/// The id is validated here, before any store access.
pub fn resolve<'r>(
    registry: &'r Registry,
    method: &Method,
    path: &str,
) -> Result<(&'r RegisteredEntity, Operation), AppError> {
    let parts = parse_path(path)?;
    let entity = registry.resolve(parts.entity)?;
    let verb = Verb::from_method(method).ok_or_else(|| not_allowed(method, path))?;
    let kind = classify(verb, &parts)?.ok_or_else(|| not_allowed(method, path))?;

    let id = || -> Result<EntityId, AppError> {
        let raw = parts.id.ok_or_else(|| not_allowed(method, path))?;
        EntityId::parse(entity.descriptor.id_kind(), raw)
    };
    let op = match kind {
        Kind::GetList => Operation::GetList,
        Kind::Create => Operation::Create,
        Kind::GetOne => Operation::GetOne(id()?),
        Kind::Update => Operation::Update(id()?),
        Kind::SoftDelete => Operation::SoftDelete(id()?),
        Kind::Restore => Operation::Restore(id()?),
    };
    Ok((entity, op))
}
