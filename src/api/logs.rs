use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_page, validate_page_size};
use super::{ApiError, ApiResponse, AppState};
use crate::domain::FacilityStatus;
use crate::services::{LogPage, TrendPoint};

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    pub status: Option<FacilityStatus>,
}

const fn default_page() -> u64 {
    1
}

const fn default_page_size() -> u64 {
    50
}

/// GET /logs
/// Event log, newest first.
pub async fn get_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogQuery>,
) -> Result<Json<ApiResponse<LogPage>>, ApiError> {
    let page = validate_page(query.page)?;
    let page_size = validate_page_size(query.page_size)?;

    let logs = state
        .facility_service()
        .logs(page, page_size, query.status)
        .await?;
    Ok(Json(ApiResponse::success(logs)))
}

/// GET /logs/weekly
pub async fn get_weekly_trend(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<TrendPoint>>>, ApiError> {
    let trend = state.facility_service().weekly_trend().await?;
    Ok(Json(ApiResponse::success(trend)))
}
