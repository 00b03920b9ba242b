//! PostgreSQL store over a sqlx pool.

use super::Store;
use crate::config::{EntityDescriptor, FieldKind};
use crate::error::AppError;
use crate::record::{Record, Scalar};
use crate::settings::Settings;
use crate::sql::{bind_all, QueryBuf};
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

/// Connect, retrying a fixed number of times with a fixed delay.
pub async fn connect_with_retry(settings: &Settings) -> Result<PgPool, sqlx::Error> {
    let mut attempt = 1;
    loop {
        let result = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.database_url)
            .await;
        match result {
            Ok(pool) => {
                tracing::info!(attempt, "connected to database");
                return Ok(pool);
            }
            Err(e) if attempt < settings.connect_retries => {
                tracing::warn!(attempt, error = %e, "database connect failed, retrying in {}s", settings.retry_delay.as_secs());
                tokio::time::sleep(settings.retry_delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn fetch_optional(&self, entity: &EntityDescriptor, q: &QueryBuf) -> Result<Option<Record>, AppError> {
        tracing::debug!(sql = %q.sql, params = q.params.len(), "query");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|r| row_to_record(entity, &r)).transpose()
    }

    async fn fetch_all(&self, entity: &EntityDescriptor, q: &QueryBuf) -> Result<Vec<Record>, AppError> {
        tracing::debug!(sql = %q.sql, params = q.params.len(), "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(|r| row_to_record(entity, r)).collect()
    }

    async fn fetch_count(&self, q: &QueryBuf) -> Result<i64, AppError> {
        tracing::debug!(sql = %q.sql, params = q.params.len(), "count");
        let row = bind_all(sqlx::query(&q.sql), &q.params)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = q.params.len(), "execute");
        let result = bind_all(sqlx::query(&q.sql), &q.params)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Scan a row positionally; the select list casts each column to match its kind.
fn row_to_record(entity: &EntityDescriptor, row: &PgRow) -> Result<Record, AppError> {
    let mut record = Record::new();
    for (idx, field) in entity.fields.iter().enumerate() {
        let value = match field.kind {
            FieldKind::Integer => row.try_get::<Option<i64>, _>(idx)?.map(Scalar::Int),
            FieldKind::Numeric => row.try_get::<Option<String>, _>(idx)?.map(Scalar::Decimal),
            FieldKind::Boolean => row.try_get::<Option<bool>, _>(idx)?.map(Scalar::Bool),
            FieldKind::Timestamp => row
                .try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(idx)?
                .map(Scalar::Timestamp),
            FieldKind::Text | FieldKind::Date | FieldKind::Uuid => {
                row.try_get::<Option<String>, _>(idx)?.map(Scalar::Text)
            }
        };
        record.insert(field.name.clone(), value.unwrap_or(Scalar::Null));
    }
    Ok(record)
}
