//! Product endpoints: CRUD, soft delete, restock and audit history.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use stockroom_core::{NewProduct, Product, ProductLog, ProductUpdate};
use tracing::info;

use crate::error::{ApiError, ApiJson, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/logs", get(product_logs))
        .route("/products/{id}/restock", post(restock_product))
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Active products, ordered by name.
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.db.products().list_active().await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state.db.products().create(input).await?;
    info!(product_id = %product.id, name = %product.name, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// A single product, active or not.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &id))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    let product = state.db.products().update(&id, changes).await?;
    info!(product_id = %product.id, version = product.version, "Product updated");
    Ok(Json(product))
}

/// Soft delete: the product disappears from listings but keeps its history.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.products().deactivate(&id).await?;
    info!(product_id = %id, "Product deactivated");
    Ok(Json(MessageResponse {
        message: "Product deactivated".to_string(),
    }))
}

pub async fn product_logs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ProductLog>>> {
    Ok(Json(state.db.product_logs().list_for_product(&id).await?))
}

pub async fn restock_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<RestockRequest>,
) -> ApiResult<Json<Product>> {
    let product = state.db.products().restock(&id, body.quantity).await?;
    info!(product_id = %product.id, quantity = body.quantity, stock = product.stock, "Product restocked");
    Ok(Json(product))
}
