use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use stockroom_core::DashboardStats;

use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardStats>> {
    Ok(Json(state.db.dashboard().stats(Utc::now()).await?))
}
