//! Simulated CCTV feeds for the facility detail view.
//!
//! Every facility has the same four zones. While the facility is alarmed the
//! storage-tank camera reports the leak with a detection confidence.

use serde::Serialize;

use crate::domain::FacilityStatus;

/// Confidence reported by the leak detector on the alarmed camera.
pub const LEAK_CONFIDENCE: f64 = 98.5;

const SAMPLE_BASE: &str = "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camera {
    pub id: &'static str,
    pub name: &'static str,
    pub status: FacilityStatus,
    pub detail: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_confidence: Option<f64>,
    pub video_url: String,
}

struct Zone {
    id: &'static str,
    name: &'static str,
    calm: &'static str,
    clip: &'static str,
}

const ZONES: [Zone; 4] = [
    Zone {
        id: "c1",
        name: "Zone A - Raw material intake",
        calm: "No anomalies",
        clip: "ElephantsDream.mp4",
    },
    Zone {
        id: "c2",
        name: "Zone B - Reactor top",
        calm: "Safe",
        clip: "BigBuckBunny.mp4",
    },
    Zone {
        id: "c3",
        name: "Zone C - Storage tank piping",
        calm: "Safe",
        clip: "TearsOfSteel.mp4",
    },
    Zone {
        id: "c4",
        name: "Zone D - Wastewater treatment",
        calm: "Safe",
        clip: "Sintel.mp4",
    },
];

const LEAK_ZONE: &str = "c3";

/// Camera list for a facility in `status`, zone order.
#[must_use]
pub fn cameras_for(status: FacilityStatus) -> Vec<Camera> {
    let alarmed = status.is_alarm();

    ZONES
        .iter()
        .map(|zone| {
            let leaking = alarmed && zone.id == LEAK_ZONE;
            let detail = match (leaking, alarmed) {
                (true, _) => "Hydrofluoric acid (HF) leak detected",
                (false, true) if zone.id == "c4" => "Operating normally",
                _ => zone.calm,
            };

            Camera {
                id: zone.id,
                name: zone.name,
                status: if leaking {
                    FacilityStatus::Danger
                } else {
                    FacilityStatus::Normal
                },
                detail,
                ai_confidence: leaking.then_some(LEAK_CONFIDENCE),
                video_url: format!("{SAMPLE_BASE}/{}", zone.clip),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_facility_has_four_quiet_cameras() {
        let cameras = cameras_for(FacilityStatus::Normal);
        assert_eq!(cameras.len(), 4);
        assert!(cameras.iter().all(|c| c.status == FacilityStatus::Normal));
        assert!(cameras.iter().all(|c| c.ai_confidence.is_none()));
        assert_eq!(cameras[0].name, "Zone A - Raw material intake");
    }

    #[test]
    fn warning_facility_flags_storage_tank_camera() {
        let cameras = cameras_for(FacilityStatus::Warning);
        let leaking: Vec<_> = cameras
            .iter()
            .filter(|c| c.status == FacilityStatus::Danger)
            .collect();

        assert_eq!(leaking.len(), 1);
        assert_eq!(leaking[0].id, "c3");
        assert_eq!(leaking[0].ai_confidence, Some(LEAK_CONFIDENCE));
        assert!(leaking[0].detail.contains("leak"));
        assert_eq!(cameras[3].detail, "Operating normally");
    }

    #[test]
    fn danger_facility_also_flags_storage_tank_camera() {
        let cameras = cameras_for(FacilityStatus::Danger);
        assert_eq!(cameras[2].status, FacilityStatus::Danger);
        assert!(cameras[..2].iter().all(|c| c.status == FacilityStatus::Normal));
    }

    #[test]
    fn camera_serializes_without_empty_confidence() {
        let json = serde_json::to_value(&cameras_for(FacilityStatus::Normal)[1]).unwrap();
        assert_eq!(json["status"], "NORMAL");
        assert!(json.get("ai_confidence").is_none());
        assert!(json["video_url"].as_str().unwrap().ends_with("BigBuckBunny.mp4"));
    }
}
