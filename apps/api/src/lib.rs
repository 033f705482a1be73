//! # stockroom-api: HTTP/JSON Server for Stockroom
//!
//! ## Route Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  /health                          GET                                   │
//! │  /api/products                    GET  POST                             │
//! │  /api/products/{id}               GET  PUT  DELETE (soft)               │
//! │  /api/products/{id}/logs          GET                                   │
//! │  /api/products/{id}/restock       POST                                  │
//! │  /api/sales                       GET  POST                             │
//! │  /api/sales/trends                GET                                   │
//! │  /api/sales/{id}                  GET                                   │
//! │  /api/dashboard                   GET                                   │
//! │                                                                         │
//! │  TraceLayer (request spans) → CorsLayer → handler → AppState { db }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The router is built here rather than in `main` so integration tests can
//! drive it in-process against an in-memory database.

pub mod config;
pub mod error;
pub mod routes;

use axum::Router;
use stockroom_db::Database;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult, ErrorCode};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .merge(routes::health::routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
