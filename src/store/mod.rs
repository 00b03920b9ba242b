//! Store seam: the four statement shapes the CRUD service needs.

mod postgres;

pub use postgres::{connect_with_retry, PgStore};

use crate::config::EntityDescriptor;
use crate::error::AppError;
use crate::record::Record;
use crate::sql::QueryBuf;
use async_trait::async_trait;

/// A relational store that runs parameterized statements. Each call is one
/// statement with the store's per-statement atomicity; no transactions.
#[async_trait]
pub trait Store: Send + Sync {
    /// Run a statement returning at most one row, scanned per `entity`.
    async fn fetch_optional(&self, entity: &EntityDescriptor, q: &QueryBuf) -> Result<Option<Record>, AppError>;

    async fn fetch_all(&self, entity: &EntityDescriptor, q: &QueryBuf) -> Result<Vec<Record>, AppError>;

    /// Run a `SELECT COUNT(*)` statement.
    async fn fetch_count(&self, q: &QueryBuf) -> Result<i64, AppError>;

    /// Run a statement and return the number of rows affected.
    async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}
