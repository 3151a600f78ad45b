//! Administrator endpoints: sign-up approval and the status simulator.
//!
//! The access gate only lets super administrators reach these handlers.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::domain::{FacilityStatus, SessionContext};
use crate::services::{ApprovalError, FacilityOption, ProfileInfo, StatusChange};

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub facility_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: FacilityStatus,
}

impl From<ApprovalError> for ApiError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::Validation(msg) => Self::validation(msg),
            ApprovalError::ProfileNotFound(id) => Self::not_found("Profile", id),
            ApprovalError::FacilityNotFound(id) => Self::not_found("Facility", id),
            e @ ApprovalError::AlreadyResolved { .. } => Self::Conflict(e.to_string()),
            ApprovalError::Database(msg) => Self::DatabaseError(msg),
            ApprovalError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /admin/users/pending
pub async fn list_pending(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ProfileInfo>>>, ApiError> {
    let pending = state.approval_service().list_pending().await?;
    Ok(Json(ApiResponse::success(pending)))
}

/// GET /admin/facilities
pub async fn facility_options(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<FacilityOption>>>, ApiError> {
    let options = state.approval_service().facility_options().await?;
    Ok(Json(ApiResponse::success(options)))
}

/// POST /admin/users/{id}/approve
pub async fn approve(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<SessionContext>,
    Path(id): Path<i32>,
    Json(payload): Json<ApproveRequest>,
) -> Result<Json<ApiResponse<ProfileInfo>>, ApiError> {
    let id = validate_id(id, "Profile")?;
    let profile = state
        .approval_service()
        .approve(id, payload.facility_id)
        .await?;

    info!(admin_id = admin.profile_id, profile_id = id, "Sign-up approved");
    Ok(Json(ApiResponse::success(profile)))
}

/// POST /admin/users/{id}/reject
pub async fn reject(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<SessionContext>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<ProfileInfo>>, ApiError> {
    let id = validate_id(id, "Profile")?;
    let profile = state.approval_service().reject(id).await?;

    info!(admin_id = admin.profile_id, profile_id = id, "Sign-up rejected");
    Ok(Json(ApiResponse::success(profile)))
}

/// POST /admin/facilities/{id}/status
/// Force a facility into a status and record it in the event log.
pub async fn set_facility_status(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<SessionContext>,
    Path(id): Path<i32>,
    Json(payload): Json<StatusRequest>,
) -> Result<Json<ApiResponse<StatusChange>>, ApiError> {
    let id = validate_id(id, "Facility")?;
    let change = state
        .facility_service()
        .set_status(id, payload.status)
        .await?;

    info!(
        admin_id = admin.profile_id,
        facility_id = id,
        status = %payload.status,
        "Simulator override applied"
    );
    Ok(Json(ApiResponse::success(change)))
}
