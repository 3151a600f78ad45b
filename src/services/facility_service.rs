//! Domain service for facility views, the event log and the status simulator.

use serde::Serialize;
use thiserror::Error;

use crate::db::{FacilityStats, NewFacility};
use crate::domain::FacilityStatus;
use crate::entities::{event_logs, facilities};
use crate::services::cameras::Camera;
use crate::services::sensors::{SensorKind, SensorReading};

#[derive(Debug, Error)]
pub enum FacilityError {
    #[error("Facility {0} not found")]
    NotFound(i32),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for FacilityError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FacilityError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result of a simulator override.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub facility: facilities::Model,
    pub log: event_logs::Model,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: FacilityStats,
    pub recent_logs: Vec<event_logs::Model>,
    pub alerts: Vec<event_logs::Model>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// `YYYY-MM-DD`, UTC.
    pub date: String,
    pub warning: u64,
    pub danger: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogPage {
    pub items: Vec<event_logs::Model>,
    pub page: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorSeries {
    pub facility_id: i32,
    pub kind: SensorKind,
    pub alarmed: bool,
    pub readings: Vec<SensorReading>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CameraFeed {
    pub facility_id: i32,
    pub alarmed: bool,
    pub cameras: Vec<Camera>,
}

#[async_trait::async_trait]
pub trait FacilityService: Send + Sync {
    async fn list(&self) -> Result<Vec<facilities::Model>, FacilityError>;

    async fn get(&self, id: i32) -> Result<facilities::Model, FacilityError>;

    async fn add(&self, facility: NewFacility) -> Result<facilities::Model, FacilityError>;

    async fn stats(&self) -> Result<FacilityStats, FacilityError>;

    /// Sets the status and appends exactly one event log entry, atomically.
    async fn set_status(
        &self,
        id: i32,
        status: FacilityStatus,
    ) -> Result<StatusChange, FacilityError>;

    async fn logs(
        &self,
        page: u64,
        page_size: u64,
        status: Option<FacilityStatus>,
    ) -> Result<LogPage, FacilityError>;

    /// Stats, the 20 newest log entries and up to 3 alarm entries among them.
    async fn dashboard(&self) -> Result<Dashboard, FacilityError>;

    /// WARNING/DANGER counts for each of the last 7 UTC days, oldest first.
    async fn weekly_trend(&self) -> Result<Vec<TrendPoint>, FacilityError>;

    async fn sensor_series(
        &self,
        id: i32,
        kind: SensorKind,
        points: Option<usize>,
    ) -> Result<SensorSeries, FacilityError>;

    /// Simulated CCTV feeds reflecting the facility's current status.
    async fn cameras(&self, id: i32) -> Result<CameraFeed, FacilityError>;
}
