//! Sale endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use stockroom_core::{CoreError, DailySales, Sale, SaleRequest};

use crate::error::{ApiJson, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/trends", get(sales_trend))
        .route("/sales/{id}", get(get_sale))
}

/// Records a sale. All lines succeed together or the request fails with no
/// stock changed.
pub async fn create_sale(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SaleRequest>,
) -> ApiResult<(StatusCode, Json<Sale>)> {
    let sale = state.db.sale_processor().process(request).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// All sales, newest first, with their items.
pub async fn list_sales(State(state): State<AppState>) -> ApiResult<Json<Vec<Sale>>> {
    Ok(Json(state.db.sales().list_recent(None).await?))
}

pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Sale>> {
    state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| CoreError::SaleNotFound(id.clone()).into())
}

/// Revenue per day for the last 7 days including today, oldest first.
pub async fn sales_trend(State(state): State<AppState>) -> ApiResult<Json<Vec<DailySales>>> {
    let today = Utc::now().date_naive();
    Ok(Json(state.db.dashboard().trend(today).await?))
}
