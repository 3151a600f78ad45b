pub mod cameras;
pub mod sensors;

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, ProfileInfo, ProfileUpdate, SignupRequest};
pub use auth_service_impl::SeaOrmAuthService;

pub mod approval_service;
pub mod approval_service_impl;
pub use approval_service::{ApprovalError, ApprovalService, FacilityOption};
pub use approval_service_impl::SeaOrmApprovalService;

pub mod facility_service;
pub mod facility_service_impl;
pub use facility_service::{
    CameraFeed, Dashboard, FacilityError, FacilityService, LogPage, SensorSeries, StatusChange,
    TrendPoint,
};
pub use facility_service_impl::SeaOrmFacilityService;
