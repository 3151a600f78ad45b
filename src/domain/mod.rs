//! Domain primitives shared by the store, services and HTTP layer.
//!
//! The status and role enums double as `SeaORM` active enums so rows carry
//! typed values end to end instead of free-form strings.

pub mod events;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization tier of a profile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "guest")]
    #[default]
    Guest,
    #[sea_orm(string_value = "facility_admin")]
    FacilityAdmin,
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::FacilityAdmin => "facility_admin",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sign-up approval state of a profile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ApprovalStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating tier of a monitored facility.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum FacilityStatus {
    #[sea_orm(string_value = "NORMAL")]
    #[default]
    Normal,
    #[sea_orm(string_value = "WARNING")]
    Warning,
    #[sea_orm(string_value = "DANGER")]
    Danger,
}

impl FacilityStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Warning => "WARNING",
            Self::Danger => "DANGER",
        }
    }

    /// WARNING and DANGER both count as alarms on the dashboard.
    #[must_use]
    pub const fn is_alarm(&self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// Message recorded in the event log when a facility is switched to this status.
    #[must_use]
    pub const fn override_message(&self) -> &'static str {
        match self {
            Self::Normal => "Inspection complete. Facility back to normal operation.",
            Self::Warning => "Anomaly detected (pressure rising)",
            Self::Danger => "Emergency: hazardous chemical leak reported!",
        }
    }
}

impl fmt::Display for FacilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and authorization of the caller, resolved once per request by the
/// access gate and handed to handlers explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    pub profile_id: i32,
    pub email: String,
    pub role: Role,
    pub facility_id: Option<i32>,
}

impl SessionContext {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::SuperAdmin)
    }
}
