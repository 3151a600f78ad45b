use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::domain::{ApprovalStatus, Role};
use crate::entities::{accounts, profiles};

/// Result of resolving a sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(profiles::Model),
    NotFound,
    AlreadyResolved(ApprovalStatus),
}

pub struct ProfileRepository {
    conn: DatabaseConnection,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: i32) -> Result<Option<profiles::Model>> {
        profiles::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query profile")
    }

    pub async fn list_pending(&self) -> Result<Vec<profiles::Model>> {
        profiles::Entity::find()
            .filter(profiles::Column::Status.eq(ApprovalStatus::Pending))
            .order_by_desc(profiles::Column::CreatedAt)
            .order_by_desc(profiles::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list pending profiles")
    }

    /// Approve a pending profile and assign it to a facility.
    pub async fn approve(&self, id: i32, facility_id: i32) -> Result<Resolution> {
        self.resolve(id, |active| {
            active.status = Set(ApprovalStatus::Approved);
            active.role = Set(Role::FacilityAdmin);
            active.facility_id = Set(Some(facility_id));
        })
        .await
    }

    /// Reject a pending profile. The role is left untouched.
    pub async fn reject(&self, id: i32) -> Result<Resolution> {
        self.resolve(id, |active| {
            active.status = Set(ApprovalStatus::Rejected);
            active.facility_id = Set(None);
        })
        .await
    }

    async fn resolve<F>(&self, id: i32, apply: F) -> Result<Resolution>
    where
        F: FnOnce(&mut profiles::ActiveModel) + Send,
    {
        let txn = self.conn.begin().await?;

        let Some(profile) = profiles::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query profile for resolution")?
        else {
            return Ok(Resolution::NotFound);
        };

        if profile.status != ApprovalStatus::Pending {
            return Ok(Resolution::AlreadyResolved(profile.status));
        }

        let mut active: profiles::ActiveModel = profile.into();
        apply(&mut active);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        let updated = active
            .update(&txn)
            .await
            .context("Failed to update profile")?;

        txn.commit().await?;

        Ok(Resolution::Resolved(updated))
    }

    /// Owner-editable settings. `None` leaves the column unchanged. The
    /// profile fields and the account password change together or not at all.
    pub async fn update_settings(
        &self,
        id: i32,
        nickname: Option<String>,
        phone: Option<String>,
        password_hash: Option<String>,
    ) -> Result<Option<profiles::Model>> {
        let txn = self.conn.begin().await?;

        let Some(profile) = profiles::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query profile for settings update")?
        else {
            return Ok(None);
        };

        let mut active: profiles::ActiveModel = profile.into();
        if let Some(nickname) = nickname {
            active.nickname = Set(Some(nickname));
        }
        if let Some(phone) = phone {
            active.phone = Set(Some(phone));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active
            .update(&txn)
            .await
            .context("Failed to update profile settings")?;

        if let Some(password_hash) = password_hash {
            let account = accounts::Entity::find_by_id(id)
                .one(&txn)
                .await
                .context("Failed to query account for password update")?
                .ok_or_else(|| anyhow::anyhow!("Account not found: {id}"))?;

            let mut active: accounts::ActiveModel = account.into();
            active.password_hash = Set(password_hash);
            active
                .update(&txn)
                .await
                .context("Failed to update password")?;
        }

        txn.commit().await?;

        Ok(Some(updated))
    }

    /// Force role and status, bypassing the pending check. Used for bootstrap
    /// administrators.
    pub async fn set_access(
        &self,
        id: i32,
        role: Role,
        status: ApprovalStatus,
    ) -> Result<Option<profiles::Model>> {
        let Some(profile) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: profiles::ActiveModel = profile.into();
        active.role = Set(role);
        active.status = Set(status);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active.update(&self.conn).await?;
        Ok(Some(updated))
    }
}
