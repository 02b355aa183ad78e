//! reading-server: HTTP API server for the reading platform export and tagging services
//!
//! This crate provides:
//! - Export endpoints that render documents, vocabulary, reviews, notes,
//!   highlights, reading history, statistics, study plans, Anki decks, zip
//!   bundles and full-account snapshots as file downloads
//! - The export audit history, templates and format catalog
//! - Tag management and tagging of documents and vocabulary entries
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - JSON error envelopes
//!
//! Handlers talk to storage only through `reading_store::Backend`, so tests
//! drive the full router against `MemoryStore`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use reading_server::{build_app, AppState, ServerConfig};
//!
//! let config = ServerConfig::from_env()?;
//! let store = Store::connect(StoreConfig::from_env()?).await?;
//! let app = build_app(AppState::new(Arc::new(store), config));
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod validate;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{propagate_request_id, request_id_layer};

// Re-exports for convenience
pub use config::{ConfigError, LogFormat, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use reading_core;
pub use reading_export;
pub use reading_store;

/// Build the router with its middleware stack.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config().cors_allowed_origins);

    routes::build_router(state)
        .layer(axum::middleware::from_fn(propagate_request_id))
        .layer(request_id_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build CORS layer from configuration. Unparseable origins are skipped.
fn build_cors_layer(allowed_origins: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.trim() == "*" {
        return layer.allow_origin(Any);
    }

    let origins: Vec<http::HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}
