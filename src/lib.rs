// Library exports for readshelf
// This allows integration tests and external code to use readshelf modules

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod feed;
pub mod ledger;
pub mod routes;
pub mod social;
pub mod state;
pub mod stats;
pub mod users;

#[cfg(test)]
pub(crate) mod testutil;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Assemble the full application router. Shared by main and the
/// integration tests.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router())
        .merge(routes::books::router())
        .merge(routes::reads::router())
        .merge(routes::social::router())
        .merge(routes::stats::router())
        .merge(routes::feed::router())
        .fallback(endpoint_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn endpoint_not_found() -> AppError {
    AppError::NotFound("Endpoint not found".into())
}
