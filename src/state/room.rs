//! Virtual room
//!
//! Collected artworks can be placed on the room's floor any number of
//! times. Positions are percentages of the room's width and height.
//! Placements live only for the session.

use rand::Rng;

/// One artwork placed in the room
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    /// Unique per placement (the same artwork can be placed twice)
    pub uid: String,
    pub artwork_id: String,
    /// Horizontal position, 20–80%
    pub x: f64,
    /// Vertical position, 25–75%
    pub y: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Room {
    placed: Vec<PlacedItem>,
    next_uid: u64,
}

impl Room {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an artwork at a random spot on the floor
    pub fn place(&mut self, artwork_id: &str) -> &PlacedItem {
        self.place_with(artwork_id, &mut rand::thread_rng())
    }

    pub fn place_with<R: Rng + ?Sized>(&mut self, artwork_id: &str, rng: &mut R) -> &PlacedItem {
        self.next_uid += 1;
        let item = PlacedItem {
            uid: format!("{artwork_id}-{}", self.next_uid),
            artwork_id: artwork_id.to_string(),
            x: rng.gen_range(20.0..80.0),
            y: rng.gen_range(25.0..75.0),
        };

        self.placed.push(item);
        &self.placed[self.placed.len() - 1]
    }

    /// Remove a single placement
    pub fn remove(&mut self, uid: &str) -> Option<PlacedItem> {
        let index = self.placed.iter().position(|p| p.uid == uid)?;
        Some(self.placed.remove(index))
    }

    /// Remove every placement of an artwork; returns how many were removed
    pub fn remove_artwork(&mut self, artwork_id: &str) -> usize {
        let before = self.placed.len();
        self.placed.retain(|p| p.artwork_id != artwork_id);
        before - self.placed.len()
    }

    pub fn clear(&mut self) {
        self.placed.clear();
    }

    pub fn placed(&self) -> &[PlacedItem] {
        &self.placed
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_positions_stay_on_the_floor() {
        let mut room = Room::new();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let item = room.place_with("vivaldi-dodo", &mut rng);
            assert!((20.0..80.0).contains(&item.x));
            assert!((25.0..75.0).contains(&item.y));
        }
    }

    #[test]
    fn test_same_artwork_twice_gets_distinct_uids() {
        let mut room = Room::new();
        let first = room.place("vivaldi-queen").uid.clone();
        let second = room.place("vivaldi-queen").uid.clone();

        assert_ne!(first, second);
        assert_eq!(room.placed().len(), 2);

        assert!(room.remove(&first).is_some());
        assert!(room.remove(&first).is_none());
        assert_eq!(room.placed().len(), 1);
    }

    #[test]
    fn test_remove_artwork() {
        let mut room = Room::new();
        room.place("vivaldi-queen");
        room.place("vivaldi-dodo");
        room.place("vivaldi-queen");

        assert_eq!(room.remove_artwork("vivaldi-queen"), 2);
        assert_eq!(room.placed().len(), 1);
        assert_eq!(room.placed()[0].artwork_id, "vivaldi-dodo");
    }
}
