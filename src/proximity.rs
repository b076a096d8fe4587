//! Proximity classification
//!
//! Turns a live distance to an art spot into a discrete state that gates
//! the scan action. Only `Arrived` enables scanning.

use serde::{Deserialize, Serialize};

use crate::format::Locale;

/// Default scan radius in meters
pub const SCAN_RADIUS_M: f64 = 100.0;
/// Default "getting closer" radius in meters
pub const NEAR_RADIUS_M: f64 = 500.0;
/// Spots further than this are flagged as off the map
pub const MAP_RADIUS_M: f64 = 5000.0;

/// Discrete proximity to a target spot
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProximityState {
    Far,
    Near,
    Arrived,
}

/// Distance thresholds used by [`classify`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Inclusive upper bound of `Arrived`
    pub scan_radius: f64,
    /// Inclusive upper bound of `Near`
    pub near_radius: f64,
    pub map_radius: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            scan_radius: SCAN_RADIUS_M,
            near_radius: NEAR_RADIUS_M,
            map_radius: MAP_RADIUS_M,
        }
    }
}

impl Thresholds {
    /// Same thresholds with a spot-specific scan radius
    pub fn with_scan_radius(self, scan_radius: f64) -> Self {
        Self { scan_radius, ..self }
    }

    /// Whether a spot at `distance` meters is close enough to show on the map
    pub fn is_on_map(&self, distance: f64) -> bool {
        distance <= self.map_radius
    }
}

/// Classify a distance in meters
///
/// Total over f64: anything that is not within a radius (NaN included)
/// is `Far`.
pub fn classify(distance: f64, thresholds: &Thresholds) -> ProximityState {
    if distance <= thresholds.scan_radius {
        ProximityState::Arrived
    } else if distance <= thresholds.near_radius {
        ProximityState::Near
    } else {
        ProximityState::Far
    }
}

/// Display information for a proximity state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityInfo {
    pub label: &'static str,
    pub label_ko: &'static str,
    pub message: &'static str,
    pub message_ko: &'static str,
    /// Hex color used by the view layer for the status badge
    pub color: &'static str,
    pub can_scan: bool,
}

impl ProximityInfo {
    pub fn label_for(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.label,
            Locale::Ko => self.label_ko,
        }
    }

    pub fn message_for(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.message,
            Locale::Ko => self.message_ko,
        }
    }
}

impl ProximityState {
    pub fn info(self) -> ProximityInfo {
        match self {
            ProximityState::Far => ProximityInfo {
                label: "Far Away",
                label_ko: "멀리 있음",
                message: "Head to the art spot to discover the artwork",
                message_ko: "아트스팟으로 이동하여 작품을 발견하세요",
                color: "#64748B",
                can_scan: false,
            },
            ProximityState::Near => ProximityInfo {
                label: "Getting Close",
                label_ko: "가까워지는 중",
                message: "Almost there! Keep walking",
                message_ko: "거의 다 왔어요! 조금만 더 이동하세요",
                color: "#F59E0B",
                can_scan: false,
            },
            ProximityState::Arrived => ProximityInfo {
                label: "Arrived",
                label_ko: "도착",
                message: "You're here! Scan the QR code to view the artwork",
                message_ko: "도착했습니다! QR 코드를 스캔하여 작품을 감상하세요",
                color: "#10B981",
                can_scan: true,
            },
        }
    }

    pub fn can_scan(self) -> bool {
        self.info().can_scan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_radius_is_inclusive() {
        let t = Thresholds::default();
        assert_eq!(classify(100.0, &t), ProximityState::Arrived);
        assert_eq!(classify(100.01, &t), ProximityState::Near);
    }

    #[test]
    fn test_near_radius_is_inclusive() {
        let t = Thresholds::default();
        assert_eq!(classify(500.0, &t), ProximityState::Near);
        assert_eq!(classify(500.01, &t), ProximityState::Far);
    }

    #[test]
    fn test_total_over_odd_inputs() {
        let t = Thresholds::default();
        assert_eq!(classify(0.0, &t), ProximityState::Arrived);
        assert_eq!(classify(-1.0, &t), ProximityState::Arrived);
        assert_eq!(classify(f64::INFINITY, &t), ProximityState::Far);
        assert_eq!(classify(f64::NAN, &t), ProximityState::Far);
    }

    #[test]
    fn test_spot_radius_override() {
        let t = Thresholds::default().with_scan_radius(30.0);
        assert_eq!(classify(50.0, &t), ProximityState::Near);
        assert_eq!(t.near_radius, NEAR_RADIUS_M);
    }

    #[test]
    fn test_only_arrived_can_scan() {
        assert!(ProximityState::Arrived.can_scan());
        assert!(!ProximityState::Near.can_scan());
        assert!(!ProximityState::Far.can_scan());
    }

    #[test]
    fn test_localized_labels() {
        let info = ProximityState::Near.info();
        assert_eq!(info.label_for(Locale::En), "Getting Close");
        assert_eq!(info.label_for(Locale::Ko), "가까워지는 중");
    }

    #[test]
    fn test_map_radius() {
        let t = Thresholds::default();
        assert!(t.is_on_map(5000.0));
        assert!(!t.is_on_map(5000.5));
    }
}
