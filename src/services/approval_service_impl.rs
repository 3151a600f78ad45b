//! `SeaORM` implementation of the `ApprovalService` trait.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::info;

use crate::db::{Resolution, Store};
use crate::domain::events::ChangeEvent;
use crate::services::approval_service::{ApprovalError, ApprovalService, FacilityOption};
use crate::services::auth_service::ProfileInfo;

pub struct SeaOrmApprovalService {
    store: Store,
    event_bus: broadcast::Sender<ChangeEvent>,
}

impl SeaOrmApprovalService {
    #[must_use]
    pub const fn new(store: Store, event_bus: broadcast::Sender<ChangeEvent>) -> Self {
        Self { store, event_bus }
    }

    fn finish(&self, profile_id: i32, resolution: Resolution) -> Result<ProfileInfo, ApprovalError> {
        match resolution {
            Resolution::Resolved(profile) => {
                let _ = self.event_bus.send(ChangeEvent::ProfileUpdated { profile_id });
                Ok(profile.into())
            }
            Resolution::NotFound => Err(ApprovalError::ProfileNotFound(profile_id)),
            Resolution::AlreadyResolved(status) => Err(ApprovalError::AlreadyResolved {
                id: profile_id,
                status,
            }),
        }
    }
}

#[async_trait]
impl ApprovalService for SeaOrmApprovalService {
    async fn list_pending(&self) -> Result<Vec<ProfileInfo>, ApprovalError> {
        let profiles = self.store.list_pending_profiles().await?;
        Ok(profiles.into_iter().map(ProfileInfo::from).collect())
    }

    async fn facility_options(&self) -> Result<Vec<FacilityOption>, ApprovalError> {
        let options = self.store.facility_options().await?;
        Ok(options
            .into_iter()
            .map(|(id, name)| FacilityOption { id, name })
            .collect())
    }

    async fn approve(
        &self,
        profile_id: i32,
        facility_id: Option<i32>,
    ) -> Result<ProfileInfo, ApprovalError> {
        let Some(facility_id) = facility_id else {
            return Err(ApprovalError::Validation(
                "Select a facility to assign before approving".to_string(),
            ));
        };

        if !self.store.facility_exists(facility_id).await? {
            return Err(ApprovalError::FacilityNotFound(facility_id));
        }

        let resolution = self.store.approve_profile(profile_id, facility_id).await?;
        let profile = self.finish(profile_id, resolution)?;

        info!(profile_id, facility_id, "Profile approved");
        Ok(profile)
    }

    async fn reject(&self, profile_id: i32) -> Result<ProfileInfo, ApprovalError> {
        let resolution = self.store.reject_profile(profile_id).await?;
        let profile = self.finish(profile_id, resolution)?;

        info!(profile_id, "Profile rejected");
        Ok(profile)
    }
}
