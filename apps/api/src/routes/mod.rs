//! HTTP route handlers, one module per resource.

pub mod dashboard;
pub mod health;
pub mod products;
pub mod sales;

use axum::Router;

use crate::AppState;

/// Everything mounted under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .merge(sales::routes())
        .merge(dashboard::routes())
}
