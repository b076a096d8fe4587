//! Art spot catalog
//!
//! Read-only reference data. The built-in catalog covers Vivaldi Park;
//! a deployment can supply its own list as a JSON file instead.

use std::fs;
use std::path::Path;

use tracing::info;

use super::data::ArtSpot;
use crate::error::AppError;
use crate::geo::GeoCoordinate;
use crate::proximity::SCAN_RADIUS_M;

/// Ordered, immutable list of art spots
#[derive(Debug, Clone, PartialEq)]
pub struct SpotCatalog {
    spots: Vec<ArtSpot>,
}

impl SpotCatalog {
    pub fn new(spots: Vec<ArtSpot>) -> Self {
        Self { spots }
    }

    /// Load a catalog from a JSON array of spot records
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let json = fs::read_to_string(path)
            .map_err(|e| AppError::Catalog(format!("{}: {e}", path.display())))?;
        let spots: Vec<ArtSpot> = serde_json::from_str(&json)
            .map_err(|e| AppError::Catalog(format!("{}: {e}", path.display())))?;

        info!("🗺️  Loaded {} art spots from {}", spots.len(), path.display());
        Ok(Self { spots })
    }

    pub fn spots(&self) -> &[ArtSpot] {
        &self.spots
    }

    pub fn get(&self, spot_id: &str) -> Option<&ArtSpot> {
        self.spots.iter().find(|s| s.id == spot_id)
    }

    /// Spot where an artwork is collected
    pub fn by_artwork(&self, artwork_id: &str) -> Option<&ArtSpot> {
        self.spots.iter().find(|s| s.artwork_id == artwork_id)
    }

    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// The Vivaldi Park catalog: one real QR-backed spot and eight virtual ones
    pub fn builtin() -> Self {
        let alice = "Lewis Carroll";
        let spots = vec![
            spot(
                "vivaldi-alice-rabbit", "Alice Rabbit", "앨리스 토끼", alice,
                37.6524, 127.6874, true,
                "https://seoyoung.swiftxr.site/seo-001", "/artworks/rabbit.png",
                "비발디파크 컨벤션센터에서 이상한 나라의 앨리스를 만나보세요.",
            ),
            spot(
                "vivaldi-cheshire", "Cheshire Cat", "체셔 고양이", alice,
                37.6534, 127.6864, false, "#", "/artworks/cat.png",
                "스키장 입구 - Coming Soon",
            ),
            spot(
                "vivaldi-queen", "Queen of Hearts", "하트 여왕", alice,
                37.6514, 127.6884, false, "#", "/artworks/queen.png",
                "오션월드 근처 - Coming Soon",
            ),
            spot(
                "vivaldi-hatter", "Mad Hatter", "매드 해터", alice,
                37.6520, 127.6890, false, "#", "/artworks/madhatter.png",
                "리조트 중앙 광장 - Coming Soon",
            ),
            spot(
                "vivaldi-white-rabbit", "White Rabbit", "백토끼", alice,
                37.6530, 127.6880, false, "#", "/artworks/alice.png",
                "골프장 클럽하우스 - Coming Soon",
            ),
            spot(
                "vivaldi-soldier", "Card Soldier", "트럼프 병사", alice,
                37.6518, 127.6868, false, "#", "/artworks/cardsoldier.png",
                "온천 스파 입구 - Coming Soon",
            ),
            spot(
                "vivaldi-caterpillar", "Caterpillar", "애벌레", alice,
                37.6528, 127.6870, false, "#", "/artworks/caterpillar.png",
                "산책로 전망대 - Coming Soon",
            ),
            spot(
                "vivaldi-dodo", "Dodo Bird", "도도새", alice,
                37.6522, 127.6878, false, "#", "/artworks/dodobird.png",
                "레스토랑 거리 - Coming Soon",
            ),
            spot(
                "vivaldi-turtle", "Mock Turtle", "모의 거북", alice,
                37.6526, 127.6882, false, "#", "/artworks/turtle.png",
                "호텔 로비 - Coming Soon",
            ),
        ];

        Self { spots }
    }
}

impl Default for SpotCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[allow(clippy::too_many_arguments)]
fn spot(
    id: &str,
    title: &str,
    title_ko: &str,
    artist: &str,
    latitude: f64,
    longitude: f64,
    is_active: bool,
    ar_url: &str,
    icon: &str,
    description: &str,
) -> ArtSpot {
    ArtSpot {
        id: id.to_string(),
        // Each spot hosts exactly one artwork sharing its ID
        artwork_id: id.to_string(),
        title: title.to_string(),
        title_ko: title_ko.to_string(),
        artist: artist.to_string(),
        coordinate: GeoCoordinate::new(latitude, longitude),
        radius: SCAN_RADIUS_M,
        is_active,
        description: description.to_string(),
        ar_url: ar_url.to_string(),
        icon: icon.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_ids_are_unique() {
        let catalog = SpotCatalog::builtin();
        let ids: HashSet<_> = catalog.spots().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), catalog.len());
        assert_eq!(catalog.len(), 9);
    }

    #[test]
    fn test_only_alice_rabbit_is_real() {
        let catalog = SpotCatalog::builtin();
        let real: Vec<_> = catalog.spots().iter().filter(|s| s.is_active).collect();
        assert_eq!(real.len(), 1);
        assert_eq!(real[0].id, "vivaldi-alice-rabbit");
        assert!(real[0].ar_url.contains("swiftxr.site"));
    }

    #[test]
    fn test_lookup() {
        let catalog = SpotCatalog::builtin();
        assert_eq!(catalog.get("vivaldi-dodo").map(|s| s.title.as_str()), Some("Dodo Bird"));
        assert_eq!(catalog.by_artwork("vivaldi-turtle").map(|s| s.id.as_str()), Some("vivaldi-turtle"));
        assert!(catalog.get("nowhere").is_none());
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spots.json");
        let builtin = SpotCatalog::builtin();
        fs::write(&path, serde_json::to_string(builtin.spots()).unwrap()).unwrap();

        let loaded = SpotCatalog::from_json_file(&path).unwrap();
        assert_eq!(loaded, builtin);
    }

    #[test]
    fn test_missing_file_is_catalog_error() {
        let err = SpotCatalog::from_json_file(Path::new("/nonexistent/spots.json")).unwrap_err();
        assert!(matches!(err, AppError::Catalog(_)));
    }
}
