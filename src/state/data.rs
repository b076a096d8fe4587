//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the collection store and the view controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::Locale;
use crate::geo::GeoCoordinate;
use crate::proximity::SCAN_RADIUS_M;

fn default_radius() -> f64 {
    SCAN_RADIUS_M
}

/// A configured physical location associated with one artwork
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtSpot {
    /// Unique spot ID (e.g., "vivaldi-alice-rabbit")
    pub id: String,
    /// Artwork collected at this spot
    pub artwork_id: String,
    /// English title
    pub title: String,
    /// Korean title
    pub title_ko: String,
    pub artist: String,
    #[serde(flatten)]
    pub coordinate: GeoCoordinate,
    /// Scan radius in meters
    #[serde(default = "default_radius")]
    pub radius: f64,
    /// Real spot with a physical QR code (GPS gated).
    /// `false` marks a virtual spot that can always be collected.
    pub is_active: bool,
    pub description: String,
    /// AR experience link encoded in the spot's QR code
    pub ar_url: String,
    /// Icon asset path
    pub icon: String,
}

impl ArtSpot {
    /// Real spots must be reached before they can be scanned
    pub fn requires_gps(&self) -> bool {
        self.is_active
    }

    pub fn display_title(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.title,
            Locale::Ko => &self.title_ko,
        }
    }
}

/// A successful collection event
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectedItem {
    pub artwork_id: String,
    /// Spot the artwork was collected at
    pub spot_id: String,
    pub collected_at: DateTime<Utc>,
    /// Where the user was when collecting
    pub location: GeoCoordinate,
}

impl CollectedItem {
    pub fn new(spot: &ArtSpot, location: GeoCoordinate, collected_at: DateTime<Utc>) -> Self {
        Self {
            artwork_id: spot.artwork_id.clone(),
            spot_id: spot.id.clone(),
            collected_at,
            location,
        }
    }
}
