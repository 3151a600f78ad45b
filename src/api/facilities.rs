use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::db::FacilityStats;
use crate::entities::facilities;
use crate::services::sensors::SensorKind;
use crate::services::{CameraFeed, Dashboard, FacilityError, SensorSeries};

#[derive(Debug, Deserialize)]
pub struct SensorQuery {
    #[serde(default = "default_kind")]
    pub kind: SensorKind,
    pub points: Option<usize>,
}

const fn default_kind() -> SensorKind {
    SensorKind::Temp
}

impl From<FacilityError> for ApiError {
    fn from(err: FacilityError) -> Self {
        match err {
            FacilityError::NotFound(id) => Self::not_found("Facility", id),
            FacilityError::Validation(msg) => Self::validation(msg),
            FacilityError::Database(msg) => Self::DatabaseError(msg),
            FacilityError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Dashboard>>, ApiError> {
    let dashboard = state.facility_service().dashboard().await?;
    Ok(Json(ApiResponse::success(dashboard)))
}

/// GET /facilities
pub async fn list_facilities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<facilities::Model>>>, ApiError> {
    let facilities = state.facility_service().list().await?;
    Ok(Json(ApiResponse::success(facilities)))
}

/// GET /facilities/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<FacilityStats>>, ApiError> {
    let stats = state.facility_service().stats().await?;
    Ok(Json(ApiResponse::success(stats)))
}

/// GET /facilities/{id}
pub async fn get_facility(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<facilities::Model>>, ApiError> {
    let id = validate_id(id, "Facility")?;
    let facility = state.facility_service().get(id).await?;
    Ok(Json(ApiResponse::success(facility)))
}

/// GET /facilities/{id}/sensors?kind=temp|gas&points=N
pub async fn get_sensor_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Query(query): Query<SensorQuery>,
) -> Result<Json<ApiResponse<SensorSeries>>, ApiError> {
    let id = validate_id(id, "Facility")?;
    let series = state
        .facility_service()
        .sensor_series(id, query.kind, query.points)
        .await?;
    Ok(Json(ApiResponse::success(series)))
}

/// GET /facilities/{id}/cameras
pub async fn get_cameras(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CameraFeed>>, ApiError> {
    let id = validate_id(id, "Facility")?;
    let feed = state.facility_service().cameras(id).await?;
    Ok(Json(ApiResponse::success(feed)))
}
