use axum::{Json, extract::State};
use chrono::Utc;
use notemarket_core::{api_types::ApiResponse, catalog::CatalogStatistics};
use serde_json::{Value, json};

use crate::AppState;
use crate::infra::errors::AppResult;

pub async fn get_statistics(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CatalogStatistics>>> {
    let stats = state.marketplace().statistics(Utc::now()).await?;
    Ok(Json(ApiResponse::success(stats)))
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
