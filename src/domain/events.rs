//! Change notifications broadcast to connected dashboards.
//!
//! Payloads are hints only: subscribers re-query the affected collection.

use serde::Serialize;

use super::FacilityStatus;

/// Collection a change notification refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Facilities,
    EventLogs,
    Profiles,
}

impl Table {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Facilities => "facilities",
            Self::EventLogs => "event_logs",
            Self::Profiles => "profiles",
        }
    }
}

/// Events sent to connected clients via SSE.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum ChangeEvent {
    FacilityUpdated {
        facility_id: i32,
        status: FacilityStatus,
    },
    EventLogInserted {
        log_id: i64,
        facility_name: String,
        status: FacilityStatus,
    },
    ProfileUpdated {
        profile_id: i32,
    },
    ProfileCreated {
        profile_id: i32,
    },
}

impl ChangeEvent {
    #[must_use]
    pub const fn table(&self) -> Table {
        match self {
            Self::FacilityUpdated { .. } => Table::Facilities,
            Self::EventLogInserted { .. } => Table::EventLogs,
            Self::ProfileUpdated { .. } | Self::ProfileCreated { .. } => Table::Profiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_tagged() {
        let event = ChangeEvent::FacilityUpdated {
            facility_id: 3,
            status: FacilityStatus::Danger,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "FacilityUpdated");
        assert_eq!(json["payload"]["facility_id"], 3);
        assert_eq!(json["payload"]["status"], "DANGER");
        assert_eq!(event.table().as_str(), "facilities");
    }

    #[test]
    fn profile_events_map_to_profiles() {
        assert_eq!(
            ChangeEvent::ProfileCreated { profile_id: 1 }.table(),
            Table::Profiles
        );
        assert_eq!(
            serde_json::to_value(Table::EventLogs).unwrap(),
            serde_json::json!("event_logs")
        );
    }
}
