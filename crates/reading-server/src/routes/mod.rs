//! Route definitions for the HTTP API.

pub mod entity_tags;
pub mod exports;
pub mod health;
pub mod history;
pub mod tags;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the complete router: API routes under the configured prefix, the
/// health check at the root.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(exports::routes())
        .merge(history::routes())
        .merge(templates::routes())
        .merge(tags::routes())
        .merge(entity_tags::routes());

    let prefix = state.config().api_prefix.clone();
    let router = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(&prefix, api)
    };

    router.merge(health::routes()).with_state(state)
}
