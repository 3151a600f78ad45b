use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{ApprovalStatus, FacilityStatus, Role};
use crate::entities::{accounts, event_logs, facilities, profiles};

pub mod migrator;
pub mod repositories;

pub use repositories::facility::{FacilityStats, NewFacility};
pub use repositories::profile::Resolution;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let path_str = db_url.trim_start_matches("sqlite:");
        let in_memory = path_str.starts_with(":memory:");

        if !in_memory {
            let file_path = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(file_path).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(file_path).exists() {
                std::fs::File::create(file_path)?;
            }
        }

        // Every pooled connection to :memory: would open its own empty database.
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn account_repo(&self) -> repositories::account::AccountRepository {
        repositories::account::AccountRepository::new(self.conn.clone())
    }

    fn profile_repo(&self) -> repositories::profile::ProfileRepository {
        repositories::profile::ProfileRepository::new(self.conn.clone())
    }

    fn facility_repo(&self) -> repositories::facility::FacilityRepository {
        repositories::facility::FacilityRepository::new(self.conn.clone())
    }

    fn event_log_repo(&self) -> repositories::event_log::EventLogRepository {
        repositories::event_log::EventLogRepository::new(self.conn.clone())
    }

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<accounts::Model>> {
        self.account_repo().find_by_email(email).await
    }

    pub async fn create_account_with_profile(
        &self,
        email: &str,
        password_hash: String,
        role: Role,
        status: ApprovalStatus,
    ) -> Result<Option<profiles::Model>> {
        self.account_repo()
            .create_with_profile(email, password_hash, role, status)
            .await
    }

    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<accounts::Model>> {
        self.account_repo().verify_credentials(email, password).await
    }

    pub async fn get_profile(&self, id: i32) -> Result<Option<profiles::Model>> {
        self.profile_repo().get(id).await
    }

    pub async fn list_pending_profiles(&self) -> Result<Vec<profiles::Model>> {
        self.profile_repo().list_pending().await
    }

    pub async fn approve_profile(&self, id: i32, facility_id: i32) -> Result<Resolution> {
        self.profile_repo().approve(id, facility_id).await
    }

    pub async fn reject_profile(&self, id: i32) -> Result<Resolution> {
        self.profile_repo().reject(id).await
    }

    pub async fn update_profile_settings(
        &self,
        id: i32,
        nickname: Option<String>,
        phone: Option<String>,
        password_hash: Option<String>,
    ) -> Result<Option<profiles::Model>> {
        self.profile_repo()
            .update_settings(id, nickname, phone, password_hash)
            .await
    }

    pub async fn set_profile_access(
        &self,
        id: i32,
        role: Role,
        status: ApprovalStatus,
    ) -> Result<Option<profiles::Model>> {
        self.profile_repo().set_access(id, role, status).await
    }

    pub async fn list_facilities(&self) -> Result<Vec<facilities::Model>> {
        self.facility_repo().list().await
    }

    pub async fn get_facility(&self, id: i32) -> Result<Option<facilities::Model>> {
        self.facility_repo().get(id).await
    }

    pub async fn facility_exists(&self, id: i32) -> Result<bool> {
        self.facility_repo().exists(id).await
    }

    pub async fn facility_options(&self) -> Result<Vec<(i32, String)>> {
        self.facility_repo().options().await
    }

    pub async fn add_facility(&self, facility: NewFacility) -> Result<facilities::Model> {
        self.facility_repo().create(facility).await
    }

    pub async fn facility_stats(&self) -> Result<FacilityStats> {
        self.facility_repo().stats().await
    }

    pub async fn set_facility_status(
        &self,
        id: i32,
        status: FacilityStatus,
        message: &str,
    ) -> Result<Option<(facilities::Model, event_logs::Model)>> {
        self.facility_repo()
            .set_status_with_log(id, status, message)
            .await
    }

    pub async fn recent_event_logs(&self, limit: u64) -> Result<Vec<event_logs::Model>> {
        self.event_log_repo().recent(limit).await
    }

    pub async fn get_event_logs(
        &self,
        page: u64,
        page_size: u64,
        status_filter: Option<FacilityStatus>,
    ) -> Result<(Vec<event_logs::Model>, u64)> {
        self.event_log_repo()
            .get_logs(page, page_size, status_filter)
            .await
    }

    pub async fn alarm_logs_since(&self, since: &str) -> Result<Vec<event_logs::Model>> {
        self.event_log_repo().alarms_since(since).await
    }

    pub async fn event_log_count(&self) -> Result<u64> {
        self.event_log_repo().count().await
    }
}
