//! Synthetic sensor readings for facility charts.
//!
//! Readings are generated on request; nothing is stored. An alarmed facility
//! reports elevated baselines so the chart visibly changes with its status.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Upper bound on readings per request.
pub const MAX_POINTS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temp,
    Gas,
}

impl SensorKind {
    /// Baseline, jitter span and decimal places.
    const fn profile(self, alarmed: bool) -> (f64, f64, i32) {
        match (self, alarmed) {
            (Self::Temp, false) => (22.0, 5.0, 1),
            (Self::Temp, true) => (80.0, 5.0, 1),
            (Self::Gas, false) => (0.002, 0.5, 3),
            (Self::Gas, true) => (4.0, 0.5, 3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorReading {
    pub time: String,
    pub value: f64,
}

/// One reading: baseline plus uniform jitter in `[0, span)`, rounded.
pub fn reading<R: Rng + ?Sized>(kind: SensorKind, alarmed: bool, rng: &mut R) -> f64 {
    let (base, span, decimals) = kind.profile(alarmed);
    let raw = base + rng.random_range(0.0..span);
    round_to(raw, decimals)
}

/// `points` readings spaced `interval_seconds` apart, oldest first, the last at `now`.
pub fn series<R: Rng + ?Sized>(
    kind: SensorKind,
    alarmed: bool,
    points: usize,
    interval_seconds: i64,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<SensorReading> {
    let points = points.min(MAX_POINTS);

    (0..points)
        .rev()
        .map(|offset| {
            let steps = i64::try_from(offset).unwrap_or(i64::MAX);
            let at = now - Duration::seconds(steps.saturating_mul(interval_seconds));
            SensorReading {
                time: at.format("%H:%M:%S").to_string(),
                value: reading(kind, alarmed, rng),
            }
        })
        .collect()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn temperature_ranges_follow_alarm_state() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let quiet = reading(SensorKind::Temp, false, &mut rng);
            assert!((22.0..=27.0).contains(&quiet), "quiet temp {quiet}");

            let alarmed = reading(SensorKind::Temp, true, &mut rng);
            assert!((80.0..=85.0).contains(&alarmed), "alarmed temp {alarmed}");
        }
    }

    #[test]
    fn gas_ranges_follow_alarm_state() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let quiet = reading(SensorKind::Gas, false, &mut rng);
            assert!((0.002..=0.502).contains(&quiet), "quiet gas {quiet}");

            let alarmed = reading(SensorKind::Gas, true, &mut rng);
            assert!((4.0..=4.5).contains(&alarmed), "alarmed gas {alarmed}");
        }
    }

    #[test]
    fn readings_are_rounded() {
        let mut rng = rand::rng();
        for _ in 0..50 {
            let t = reading(SensorKind::Temp, false, &mut rng);
            assert!(((t * 10.0).round() - t * 10.0).abs() < 1e-9);

            let g = reading(SensorKind::Gas, true, &mut rng);
            assert!(((g * 1000.0).round() - g * 1000.0).abs() < 1e-6);
        }
    }

    #[test]
    fn series_ends_at_now_and_is_capped() {
        let mut rng = rand::rng();
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 10).unwrap();

        let readings = series(SensorKind::Temp, false, 10, 1, now, &mut rng);
        assert_eq!(readings.len(), 10);
        assert_eq!(readings.first().unwrap().time, "12:00:01");
        assert_eq!(readings.last().unwrap().time, "12:00:10");

        let capped = series(SensorKind::Gas, false, 10_000, 1, now, &mut rng);
        assert_eq!(capped.len(), MAX_POINTS);
    }

    #[test]
    fn kind_parses_lowercase() {
        let kind: SensorKind = serde_json::from_str("\"gas\"").unwrap();
        assert_eq!(kind, SensorKind::Gas);
    }
}
