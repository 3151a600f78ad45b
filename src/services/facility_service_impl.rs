//! `SeaORM` implementation of the `FacilityService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use tokio::sync::{RwLock, broadcast};
use tracing::info;

use crate::config::Config;
use crate::db::{FacilityStats, NewFacility, Store};
use crate::domain::FacilityStatus;
use crate::domain::events::ChangeEvent;
use crate::entities::{event_logs, facilities};
use crate::services::cameras;
use crate::services::facility_service::{
    CameraFeed, Dashboard, FacilityError, FacilityService, LogPage, SensorSeries, StatusChange,
    TrendPoint,
};
use crate::services::sensors::{self, SensorKind};

const RECENT_LOG_LIMIT: u64 = 20;
const ALERT_LIMIT: usize = 3;
const TREND_DAYS: i64 = 7;

pub struct SeaOrmFacilityService {
    store: Store,
    config: Arc<RwLock<Config>>,
    event_bus: broadcast::Sender<ChangeEvent>,
}

impl SeaOrmFacilityService {
    #[must_use]
    pub const fn new(
        store: Store,
        config: Arc<RwLock<Config>>,
        event_bus: broadcast::Sender<ChangeEvent>,
    ) -> Self {
        Self {
            store,
            config,
            event_bus,
        }
    }
}

#[async_trait]
impl FacilityService for SeaOrmFacilityService {
    async fn list(&self) -> Result<Vec<facilities::Model>, FacilityError> {
        Ok(self.store.list_facilities().await?)
    }

    async fn get(&self, id: i32) -> Result<facilities::Model, FacilityError> {
        self.store
            .get_facility(id)
            .await?
            .ok_or(FacilityError::NotFound(id))
    }

    async fn add(&self, facility: NewFacility) -> Result<facilities::Model, FacilityError> {
        if facility.name.trim().is_empty() {
            return Err(FacilityError::Validation(
                "Facility name cannot be empty".to_string(),
            ));
        }
        if !(-90.0..=90.0).contains(&facility.lat) || !(-180.0..=180.0).contains(&facility.lng) {
            return Err(FacilityError::Validation(
                "Coordinates are out of range".to_string(),
            ));
        }

        let created = self.store.add_facility(facility).await?;
        info!(facility_id = created.id, name = %created.name, "Facility added");
        let _ = self.event_bus.send(ChangeEvent::FacilityUpdated {
            facility_id: created.id,
            status: created.status,
        });
        Ok(created)
    }

    async fn stats(&self) -> Result<FacilityStats, FacilityError> {
        Ok(self.store.facility_stats().await?)
    }

    async fn set_status(
        &self,
        id: i32,
        status: FacilityStatus,
    ) -> Result<StatusChange, FacilityError> {
        let (facility, log) = self
            .store
            .set_facility_status(id, status, status.override_message())
            .await?
            .ok_or(FacilityError::NotFound(id))?;

        metrics::counter!("facility_status_changes_total", "status" => status.as_str())
            .increment(1);
        info!(
            facility_id = id,
            facility = %facility.name,
            status = %status,
            log_id = log.id,
            "Facility status overridden"
        );

        let _ = self.event_bus.send(ChangeEvent::FacilityUpdated {
            facility_id: id,
            status,
        });
        let _ = self.event_bus.send(ChangeEvent::EventLogInserted {
            log_id: log.id,
            facility_name: log.facility_name.clone(),
            status,
        });

        Ok(StatusChange { facility, log })
    }

    async fn logs(
        &self,
        page: u64,
        page_size: u64,
        status: Option<FacilityStatus>,
    ) -> Result<LogPage, FacilityError> {
        let page = page.max(1);
        let (items, total_pages) = self.store.get_event_logs(page, page_size, status).await?;
        Ok(LogPage {
            items,
            page,
            total_pages,
        })
    }

    async fn dashboard(&self) -> Result<Dashboard, FacilityError> {
        let stats = self.store.facility_stats().await?;
        let recent_logs = self.store.recent_event_logs(RECENT_LOG_LIMIT).await?;
        let alerts = select_alerts(&recent_logs);

        Ok(Dashboard {
            stats,
            recent_logs,
            alerts,
        })
    }

    async fn weekly_trend(&self) -> Result<Vec<TrendPoint>, FacilityError> {
        let today = Utc::now().date_naive();
        let first_day = today - Duration::days(TREND_DAYS - 1);
        let since = first_day
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().to_rfc3339())
            .ok_or_else(|| FacilityError::Internal("Invalid trend window".to_string()))?;

        let logs = self.store.alarm_logs_since(&since).await?;
        Ok(bucket_by_day(first_day, &logs))
    }

    async fn sensor_series(
        &self,
        id: i32,
        kind: SensorKind,
        points: Option<usize>,
    ) -> Result<SensorSeries, FacilityError> {
        let facility = self.get(id).await?;
        let sensors_cfg = self.config.read().await.sensors.clone();

        let points = points.unwrap_or(sensors_cfg.history_points);
        if points == 0 || points > sensors::MAX_POINTS {
            return Err(FacilityError::Validation(format!(
                "points must be between 1 and {}",
                sensors::MAX_POINTS
            )));
        }

        let alarmed = facility.status.is_alarm();
        let readings = sensors::series(
            kind,
            alarmed,
            points,
            sensors_cfg.interval_seconds,
            Utc::now(),
            &mut rand::rng(),
        );

        Ok(SensorSeries {
            facility_id: id,
            kind,
            alarmed,
            readings,
        })
    }

    async fn cameras(&self, id: i32) -> Result<CameraFeed, FacilityError> {
        let facility = self.get(id).await?;

        Ok(CameraFeed {
            facility_id: id,
            alarmed: facility.status.is_alarm(),
            cameras: cameras::cameras_for(facility.status),
        })
    }
}

fn select_alerts(recent: &[event_logs::Model]) -> Vec<event_logs::Model> {
    recent
        .iter()
        .filter(|log| log.status.is_alarm())
        .take(ALERT_LIMIT)
        .cloned()
        .collect()
}

fn bucket_by_day(first_day: NaiveDate, logs: &[event_logs::Model]) -> Vec<TrendPoint> {
    let mut points: Vec<TrendPoint> = (0..TREND_DAYS)
        .map(|offset| TrendPoint {
            date: (first_day + Duration::days(offset))
                .format("%Y-%m-%d")
                .to_string(),
            warning: 0,
            danger: 0,
        })
        .collect();

    for log in logs {
        let Ok(created) = chrono::DateTime::parse_from_rfc3339(&log.created_at) else {
            continue;
        };
        let day = created.with_timezone(&Utc).date_naive();
        let Ok(index) = usize::try_from((day - first_day).num_days()) else {
            continue;
        };
        let Some(point) = points.get_mut(index) else {
            continue;
        };
        match log.status {
            FacilityStatus::Warning => point.warning += 1,
            FacilityStatus::Danger => point.danger += 1,
            FacilityStatus::Normal => {}
        }
    }

    points
}
