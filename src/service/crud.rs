//! Generic CRUD execution: hooks, statement building, one store call per operation.

use crate::config::RegisteredEntity;
use crate::error::AppError;
use crate::hooks::{HookPayload, HookPoint};
use crate::pagination::Pagination;
use crate::record::{EntityId, Record};
use crate::response::ListPage;
use crate::sql::{build_create, build_get_list, build_get_one, build_restore, build_soft_delete, build_update};
use crate::store::Store;

pub struct CrudService;

impl CrudService {
    /// Fetch one active row.
    pub async fn get_one(store: &dyn Store, entity: &RegisteredEntity, id: &EntityId) -> Result<Record, AppError> {
        let e = &entity.descriptor;
        let q = build_get_one(e, id);
        store
            .fetch_optional(e, &q)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", e.key, id)))
    }

    /// One page of active rows plus a total from a separate count statement.
    /// The two statements are not isolated from each other, so the total may
    /// already be stale when the page is read. A failing count degrades
    /// `total_data` to 0 instead of failing the listing.
    pub async fn list(
        store: &dyn Store,
        entity: &RegisteredEntity,
        pagination: Pagination,
        search: Option<&str>,
    ) -> Result<ListPage, AppError> {
        let e = &entity.descriptor;
        let stmts = build_get_list(e, &pagination, search);
        let total = match store.fetch_count(&stmts.count).await {
            Ok(n) => n,
            Err(err) => {
                tracing::warn!(entity = %e.key, error = %err, "count failed, reporting total_data = 0");
                0
            }
        };
        let data = store.fetch_all(e, &stmts.page).await?;
        Ok(ListPage {
            page: pagination.page,
            limit: pagination.limit,
            total_data: total,
            total_page: pagination.total_pages(total),
            data,
        })
    }

    /// Insert one row after the create hook passes. Returns the stored row.
    pub async fn create(store: &dyn Store, entity: &RegisteredEntity, record: &Record) -> Result<Record, AppError> {
        let e = &entity.descriptor;
        entity
            .hooks
            .run_before(HookPoint::BeforeCreate, HookPayload::Record(record))?;
        let q = build_create(e, record);
        let row = store
            .fetch_optional(e, &q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        tracing::info!(entity = %e.key, id = ?row.get("id"), "created");
        Ok(row)
    }

    /// Update an active row. Last writer wins; there is no version check.
    pub async fn update(
        store: &dyn Store,
        entity: &RegisteredEntity,
        id: &EntityId,
        record: &Record,
    ) -> Result<Record, AppError> {
        let e = &entity.descriptor;
        entity
            .hooks
            .run_before(HookPoint::BeforeUpdate, HookPayload::Record(record))?;
        let q = build_update(e, id, record)?;
        store
            .fetch_optional(e, &q)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", e.key, id)))
    }

    pub async fn soft_delete(store: &dyn Store, entity: &RegisteredEntity, id: &EntityId) -> Result<(), AppError> {
        let e = &entity.descriptor;
        entity
            .hooks
            .run_before(HookPoint::BeforeDelete, HookPayload::Id(id))?;
        let q = build_soft_delete(e, id);
        if store.execute(&q).await? == 0 {
            return Err(AppError::NotFound(format!("{} {}", e.key, id)));
        }
        tracing::info!(entity = %e.key, %id, "soft deleted");
        Ok(())
    }

    /// Clear deleted_at. Restoring an active row succeeds; a missing id is not found.
    pub async fn restore(store: &dyn Store, entity: &RegisteredEntity, id: &EntityId) -> Result<Record, AppError> {
        let e = &entity.descriptor;
        let q = build_restore(e, id);
        let row = store
            .fetch_optional(e, &q)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", e.key, id)))?;
        tracing::info!(entity = %e.key, %id, "restored");
        Ok(row)
    }
}
