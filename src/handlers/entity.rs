//! Single entry point for entity CRUD: dispatch the path, run the operation,
//! shape the response.

use crate::dispatch::{self, Operation};
use crate::error::AppError;
use crate::pagination::{search_term, Pagination};
use crate::record::Record;
use crate::service::CrudService;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

fn parse_body(body: &Bytes) -> Result<Value, AppError> {
    serde_json::from_slice(body).map_err(|_| AppError::BadRequest("invalid JSON".into()))
}

pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    path: Result<Path<String>, PathRejection>,
    params: Result<Query<HashMap<String, String>>, QueryRejection>,
    body: Bytes,
) -> Result<Response, AppError> {
    let Path(path) = path.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let (entity, op) = dispatch::resolve(&state.registry, &method, &path)?;
    let store = state.store.as_ref();
    tracing::debug!(entity = %entity.descriptor.key, ?op, "dispatch");

    let response = match op {
        Operation::GetList => {
            let pagination = Pagination::from_query(&params);
            let search = search_term(&params);
            let page = CrudService::list(store, entity, pagination, search.as_deref()).await?;
            (StatusCode::OK, Json(page)).into_response()
        }
        Operation::GetOne(id) => {
            let row = CrudService::get_one(store, entity, &id).await?;
            (StatusCode::OK, Json(row)).into_response()
        }
        Operation::Create => {
            let record = Record::from_body(&entity.descriptor, &parse_body(&body)?)?;
            let row = CrudService::create(store, entity, &record).await?;
            (StatusCode::CREATED, Json(row)).into_response()
        }
        Operation::Update(id) => {
            let record = Record::from_body(&entity.descriptor, &parse_body(&body)?)?;
            let row = CrudService::update(store, entity, &id, &record).await?;
            (StatusCode::OK, Json(row)).into_response()
        }
        Operation::SoftDelete(id) => {
            CrudService::soft_delete(store, entity, &id).await?;
            StatusCode::NO_CONTENT.into_response()
        }
        Operation::Restore(id) => {
            let row = CrudService::restore(store, entity, &id).await?;
            (StatusCode::OK, Json(row)).into_response()
        }
    };
    Ok(response)
}

/// Requests no route matches, such as `/`.
pub async fn not_found() -> AppError {
    AppError::NotFound("no such route".into())
}
