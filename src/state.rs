use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::config::Config;
use crate::db::Store;
use crate::domain::events::ChangeEvent;
use crate::services::{
    ApprovalService, AuthService, FacilityService, SeaOrmApprovalService, SeaOrmAuthService,
    SeaOrmFacilityService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub event_bus: broadcast::Sender<ChangeEvent>,

    pub auth_service: Arc<dyn AuthService>,

    pub approval_service: Arc<dyn ApprovalService>,

    pub facility_service: Arc<dyn FacilityService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::with_event_bus(config, event_bus).await
    }

    pub async fn with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<ChangeEvent>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let config = Arc::new(RwLock::new(config));

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.clone(),
            event_bus.clone(),
        )) as Arc<dyn AuthService>;

        let approval_service = Arc::new(SeaOrmApprovalService::new(
            store.clone(),
            event_bus.clone(),
        )) as Arc<dyn ApprovalService>;

        let facility_service = Arc::new(SeaOrmFacilityService::new(
            store.clone(),
            config.clone(),
            event_bus.clone(),
        )) as Arc<dyn FacilityService>;

        Ok(Self {
            config,
            store,
            event_bus,
            auth_service,
            approval_service,
            facility_service,
        })
    }
}
