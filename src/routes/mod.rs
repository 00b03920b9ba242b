//! Router assembly.

pub mod common;
pub mod entity;

pub use common::common_routes_with_ready;
pub use entity::entity_routes;

use crate::handlers::entity::not_found;
use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

/// Request bodies above this size are rejected before reaching a handler.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Operational routes merged with entity CRUD. Static routes take precedence
/// over the catch-all entity path.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .merge(entity_routes(state))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}
