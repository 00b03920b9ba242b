//! Response bodies for list results.

use crate::record::Record;
use serde::Serialize;

/// Paged list envelope: `{ page, limit, total_data, total_page, data }`.
#[derive(Debug, Serialize)]
pub struct ListPage {
    pub page: u32,
    pub limit: u32,
    pub total_data: i64,
    pub total_page: i64,
    pub data: Vec<Record>,
}
