use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;
use tracing::{info, warn};

use super::gate::SESSION_ACCOUNT_KEY;
use super::observability::RequestSpan;
use super::validation::validate_credentials;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::domain::SessionContext;
use crate::services::{AuthError, ProfileInfo, ProfileUpdate, SignupRequest};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                Self::Unauthorized("Invalid email or password".to_string())
            }
            AuthError::NotApproved(status) => Self::NotApproved(status),
            AuthError::EmailTaken => Self::Conflict("Email is already registered".to_string()),
            AuthError::ProfileNotFound => Self::NotFound("Profile not found".to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// POST /auth/signup
/// Register a new account. The profile starts pending and cannot sign in yet.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProfileInfo>>), ApiError> {
    let profile = state.auth_service().signup(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(profile))))
}

/// POST /auth/login
/// Only approved profiles get a session; everyone else leaves without one.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    request_span: Option<Extension<RequestSpan>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<ProfileInfo>>, ApiError> {
    let email = validate_credentials(&payload.email, &payload.password)?;

    match state.auth_service().login(email, &payload.password).await {
        Ok(profile) => {
            session.cycle_id().await?;
            session.insert(SESSION_ACCOUNT_KEY, profile.id).await?;

            metrics::counter!("auth_login_total", "outcome" => "success").increment(1);
            if let Some(Extension(span)) = &request_span {
                span.0.record("user_id", profile.id);
                span.0.record("role", profile.role.as_str());
            }
            info!(profile_id = profile.id, role = %profile.role, "Login succeeded");

            Ok(Json(ApiResponse::success(profile)))
        }
        Err(AuthError::NotApproved(status)) => {
            session.flush().await?;
            metrics::counter!("auth_login_total", "outcome" => status.as_str()).increment(1);
            warn!(status = %status, "Login refused for unapproved profile");
            Err(ApiError::NotApproved(status))
        }
        Err(AuthError::InvalidCredentials) => {
            metrics::counter!("auth_login_total", "outcome" => "invalid_credentials")
                .increment(1);
            Err(AuthError::InvalidCredentials.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    session.flush().await?;
    Ok(Json(ApiResponse::success(MessageResponse::new("Logged out"))))
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
) -> Result<Json<ApiResponse<ProfileInfo>>, ApiError> {
    let profile = state.auth_service().get_profile(ctx.profile_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

/// PUT /auth/profile
/// Update nickname, phone and optionally the password.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<SessionContext>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<ApiResponse<ProfileInfo>>, ApiError> {
    let profile = state
        .auth_service()
        .update_profile(ctx.profile_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(profile)))
}
