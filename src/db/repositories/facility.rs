use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;

use crate::domain::FacilityStatus;
use crate::entities::{event_logs, facilities};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FacilityStats {
    pub total: u64,
    pub normal: u64,
    pub warning: u64,
    pub danger: u64,
}

#[derive(Debug, Clone)]
pub struct NewFacility {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

pub struct FacilityRepository {
    conn: DatabaseConnection,
}

impl FacilityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<facilities::Model>> {
        facilities::Entity::find()
            .order_by_asc(facilities::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list facilities")
    }

    pub async fn get(&self, id: i32) -> Result<Option<facilities::Model>> {
        facilities::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query facility")
    }

    pub async fn exists(&self, id: i32) -> Result<bool> {
        let count = facilities::Entity::find_by_id(id).count(&self.conn).await?;
        Ok(count > 0)
    }

    /// `(id, name)` pairs ordered by id.
    pub async fn options(&self) -> Result<Vec<(i32, String)>> {
        facilities::Entity::find()
            .select_only()
            .column(facilities::Column::Id)
            .column(facilities::Column::Name)
            .order_by_asc(facilities::Column::Id)
            .into_tuple()
            .all(&self.conn)
            .await
            .context("Failed to list facility options")
    }

    pub async fn create(&self, facility: NewFacility) -> Result<facilities::Model> {
        facilities::ActiveModel {
            name: Set(facility.name),
            address: Set(facility.address),
            lat: Set(facility.lat),
            lng: Set(facility.lng),
            status: Set(FacilityStatus::Normal),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert facility")
    }

    pub async fn stats(&self) -> Result<FacilityStats> {
        let count = |status: FacilityStatus| {
            facilities::Entity::find()
                .filter(facilities::Column::Status.eq(status))
                .count(&self.conn)
        };

        let normal = count(FacilityStatus::Normal).await?;
        let warning = count(FacilityStatus::Warning).await?;
        let danger = count(FacilityStatus::Danger).await?;

        Ok(FacilityStats {
            total: normal + warning + danger,
            normal,
            warning,
            danger,
        })
    }

    /// Update the status and append the matching event log entry atomically.
    /// Returns `None` when the facility does not exist.
    pub async fn set_status_with_log(
        &self,
        id: i32,
        status: FacilityStatus,
        message: &str,
    ) -> Result<Option<(facilities::Model, event_logs::Model)>> {
        let txn = self.conn.begin().await?;

        let Some(facility) = facilities::Entity::find_by_id(id)
            .one(&txn)
            .await
            .context("Failed to query facility for status update")?
        else {
            return Ok(None);
        };

        let mut active: facilities::ActiveModel = facility.into();
        active.status = Set(status);
        let facility = active
            .update(&txn)
            .await
            .context("Failed to update facility status")?;

        let log = event_logs::ActiveModel {
            facility_name: Set(facility.name.clone()),
            status: Set(status),
            message: Set(message.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert event log")?;

        txn.commit().await?;

        Ok(Some((facility, log)))
    }
}
