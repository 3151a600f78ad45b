use crate::domain::FacilityStatus;
use crate::entities::{event_logs, prelude::*};
use anyhow::Result;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

pub struct EventLogRepository {
    conn: DatabaseConnection,
}

impl EventLogRepository {
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<event_logs::Model>> {
        let items = EventLogs::find()
            .order_by_desc(event_logs::Column::CreatedAt)
            .order_by_desc(event_logs::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(items)
    }

    pub async fn get_logs(
        &self,
        page: u64,
        page_size: u64,
        status_filter: Option<FacilityStatus>,
    ) -> Result<(Vec<event_logs::Model>, u64)> {
        let mut query = EventLogs::find()
            .order_by_desc(event_logs::Column::CreatedAt)
            .order_by_desc(event_logs::Column::Id);

        if let Some(status) = status_filter {
            query = query.filter(event_logs::Column::Status.eq(status));
        }

        let paginator = query.paginate(&self.conn, page_size);
        let total_pages = paginator.num_pages().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok((items, total_pages))
    }

    /// WARNING and DANGER entries created at or after `since` (RFC 3339).
    pub async fn alarms_since(&self, since: &str) -> Result<Vec<event_logs::Model>> {
        let items = EventLogs::find()
            .filter(event_logs::Column::CreatedAt.gte(since))
            .filter(
                event_logs::Column::Status
                    .is_in([FacilityStatus::Warning, FacilityStatus::Danger]),
            )
            .order_by_asc(event_logs::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        Ok(items)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(EventLogs::find().count(&self.conn).await?)
    }
}
