//! nr-web library - Next Reads HTTP service
//!
//! Serves the catalog read endpoints and the four bookshelf endpoints used by
//! the front end, on top of the Content Gateway and the Category Mutation
//! Gateway.

use axum::Router;
use nr_common::content::ContentGateway;
use nr_common::management::CategoryGateway;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Read access to the content store
    pub content: ContentGateway,
    /// Category mutations through the management API
    pub categories: CategoryGateway,
    /// Server start, for uptime reporting
    pub startup_time: Instant,
}

impl AppState {
    pub fn new(content: ContentGateway, categories: CategoryGateway) -> Self {
        Self {
            content,
            categories,
            startup_time: Instant::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::my_books_routes())
        .merge(api::catalog_routes())
        .merge(api::search_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
