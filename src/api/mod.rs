use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::domain::events::ChangeEvent;
use crate::services::{ApprovalService, AuthService, FacilityService};
use crate::state::SharedState;

mod admin;
pub mod auth;
mod error;
pub mod events;
mod facilities;
pub mod gate;
mod health;
mod logs;
mod observability;
mod pages;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn event_bus(&self) -> &tokio::sync::broadcast::Sender<ChangeEvent> {
        &self.shared.event_bus
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn approval_service(&self) -> &Arc<dyn ApprovalService> {
        &self.shared.approval_service
    }

    #[must_use]
    pub fn facility_service(&self) -> &Arc<dyn FacilityService> {
        &self.shared.facility_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_minutes) = {
        let config = state.config().read().await;
        (
            config.server.cors_allowed_origins.clone(),
            config.server.secure_cookies,
            config.server.session_inactivity_minutes,
        )
    };

    // Saving on every request slides the inactivity deadline and re-issues the
    // cookie on each response of a live session.
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_always_save(true)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_minutes,
        )));

    let api_router = create_api_router().with_state(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
    };

    // Layers run outermost-last: logging wraps everything and the gate sees
    // the session loaded by the session layer.
    Router::new()
        .nest("/api", api_router)
        .fallback(pages::serve_page)
        .layer(middleware::from_fn_with_state(state, gate::access_gate))
        .layer(session_layer)
        .layer(
            cors_layer
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/profile", put(auth::update_profile))
        .route("/dashboard", get(facilities::dashboard))
        .route("/facilities", get(facilities::list_facilities))
        .route("/facilities/stats", get(facilities::get_stats))
        .route("/facilities/{id}", get(facilities::get_facility))
        .route(
            "/facilities/{id}/sensors",
            get(facilities::get_sensor_series),
        )
        .route("/facilities/{id}/cameras", get(facilities::get_cameras))
        .route("/logs", get(logs::get_logs))
        .route("/logs/weekly", get(logs::get_weekly_trend))
        .route("/admin/users/pending", get(admin::list_pending))
        .route("/admin/users/{id}/approve", post(admin::approve))
        .route("/admin/users/{id}/reject", post(admin::reject))
        .route("/admin/facilities", get(admin::facility_options))
        .route(
            "/admin/facilities/{id}/status",
            post(admin::set_facility_status),
        )
        .route("/metrics", get(observability::get_metrics))
        .merge(events::router())
        .fallback(api_not_found)
}

async fn api_not_found() -> ApiError {
    ApiError::NotFound("No such API endpoint".to_string())
}
