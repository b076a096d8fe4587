//! Geodesic utilities
//!
//! Great-circle distance between two GPS fixes, using the Haversine formula
//! on a spherical Earth. Inputs are WGS84 decimal degrees and are not
//! validated: the area of use is a single park with known-good coordinates.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in decimal degrees
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Distance to `other` in meters
    pub fn distance_to(&self, other: &GeoCoordinate) -> f64 {
        distance_meters(self, other)
    }

    /// Point `fraction` of the way from `self` to `other`
    ///
    /// Plain linear interpolation in degrees, which is accurate enough over
    /// the few hundred meters a simulated walk covers.
    pub fn lerp(&self, other: &GeoCoordinate, fraction: f64) -> GeoCoordinate {
        GeoCoordinate {
            latitude: self.latitude + (other.latitude - self.latitude) * fraction,
            longitude: self.longitude + (other.longitude - self.longitude) * fraction,
        }
    }
}

/// Great-circle surface distance between two coordinates, in meters
///
/// # Algorithm
/// 1. Convert both points to radians
/// 2. a = sin²(Δφ/2) + cos φ1 · cos φ2 · sin²(Δλ/2)
/// 3. c = 2 · atan2(√a, √(1−a))
/// 4. distance = R · c
pub fn distance_meters(a: &GeoCoordinate, b: &GeoCoordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Check whether `user` is within `range_m` meters of `target` (inclusive)
pub fn is_within_range(user: &GeoCoordinate, target: &GeoCoordinate, range_m: f64) -> bool {
    distance_meters(user, target) <= range_m
}
