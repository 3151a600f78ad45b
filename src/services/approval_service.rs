//! Domain service for resolving pending sign-ups.

use serde::Serialize;
use thiserror::Error;

use crate::domain::ApprovalStatus;
use crate::services::auth_service::ProfileInfo;

#[derive(Debug, Error)]
pub enum ApprovalError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Profile {0} not found")]
    ProfileNotFound(i32),

    #[error("Facility {0} not found")]
    FacilityNotFound(i32),

    #[error("Profile {id} is already {status}")]
    AlreadyResolved { id: i32, status: ApprovalStatus },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ApprovalError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ApprovalError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Facility choice offered when approving a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacilityOption {
    pub id: i32,
    pub name: String,
}

#[async_trait::async_trait]
pub trait ApprovalService: Send + Sync {
    /// Pending profiles, newest first.
    async fn list_pending(&self) -> Result<Vec<ProfileInfo>, ApprovalError>;

    /// Facilities ordered by id.
    async fn facility_options(&self) -> Result<Vec<FacilityOption>, ApprovalError>;

    /// Approves a pending profile as a facility administrator.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::Validation`] when no facility is given; nothing
    /// is written in that case.
    async fn approve(
        &self,
        profile_id: i32,
        facility_id: Option<i32>,
    ) -> Result<ProfileInfo, ApprovalError>;

    /// Rejects a pending profile and clears its facility assignment.
    async fn reject(&self, profile_id: i32) -> Result<ProfileInfo, ApprovalError>;
}
