//! Entity CRUD route: one catch-all path feeding the dispatcher.
//! Handlers resolve the entity, id and action from the captured path.

use crate::handlers::entity::dispatch;
use crate::state::AppState;
use axum::{routing::any, Router};

pub fn entity_routes(state: AppState) -> Router {
    Router::new()
        .route("/*path", any(dispatch))
        .with_state(state)
}
