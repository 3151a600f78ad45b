//! Domain service for sign-up, gatekept login and per-request session resolution.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ApprovalStatus, Role, SessionContext};
use crate::entities::profiles;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Credentials were valid but the profile may not sign in yet.
    #[error("Profile is {0}")]
    NotApproved(ApprovalStatus),

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Profile not found")]
    ProfileNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Profile DTO returned to the owner and to administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileInfo {
    pub id: i32,
    pub email: String,
    pub role: Role,
    pub status: ApprovalStatus,
    pub facility_id: Option<i32>,
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<profiles::Model> for ProfileInfo {
    fn from(model: profiles::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            status: model.status,
            facility_id: model.facility_id,
            nickname: model.nickname,
            phone: model.phone,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Owner-editable settings. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub nickname: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account and its pending guest profile. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for malformed input and
    /// [`AuthError::EmailTaken`] for a duplicate email.
    async fn signup(&self, request: SignupRequest) -> Result<ProfileInfo, AuthError>;

    /// Verifies credentials and the approval status.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] on a bad email/password pair and
    /// [`AuthError::NotApproved`] when the profile is pending, rejected or missing.
    async fn login(&self, email: &str, password: &str) -> Result<ProfileInfo, AuthError>;

    /// Builds the request context for a session subject. `None` means the
    /// session must be terminated.
    async fn resolve_session(&self, account_id: i32)
    -> Result<Option<SessionContext>, AuthError>;

    async fn get_profile(&self, profile_id: i32) -> Result<ProfileInfo, AuthError>;

    /// Validates every field before writing any of them.
    async fn update_profile(
        &self,
        profile_id: i32,
        update: ProfileUpdate,
    ) -> Result<ProfileInfo, AuthError>;

    /// Creates an approved super administrator, or promotes an existing account.
    ///
    /// `password` is required for a new account. An existing account keeps its
    /// current password; a supplied one is ignored with a warning.
    async fn create_super_admin(
        &self,
        email: &str,
        password: Option<&str>,
    ) -> Result<ProfileInfo, AuthError>;
}
