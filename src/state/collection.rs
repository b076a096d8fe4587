//! The user's collection
//!
//! A set of collected items keyed by artwork ID, kept in collection order.

use chrono::{DateTime, Utc};

use super::data::CollectedItem;

/// Result of trying to add an artwork to the collection
#[derive(Debug, Clone, PartialEq)]
pub enum CollectOutcome {
    /// Newly added
    Collected(CollectedItem),
    /// The artwork was already in the collection; nothing changed
    AlreadyCollected,
}

impl CollectOutcome {
    pub fn is_new(&self) -> bool {
        matches!(self, CollectOutcome::Collected(_))
    }
}

/// Aggregate numbers for the collection screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionStats {
    pub total_collected: usize,
    pub last_collected_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    items: Vec<CollectedItem>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted items, dropping later duplicates of an artwork
    pub fn from_items(items: Vec<CollectedItem>) -> Self {
        let mut collection = Self::new();
        for item in items {
            collection.collect(item);
        }
        collection
    }

    pub fn collect(&mut self, item: CollectedItem) -> CollectOutcome {
        if self.is_collected(&item.artwork_id) {
            return CollectOutcome::AlreadyCollected;
        }

        self.items.push(item.clone());
        CollectOutcome::Collected(item)
    }

    /// Remove an artwork; returns the removed item if it was present
    pub fn remove(&mut self, artwork_id: &str) -> Option<CollectedItem> {
        let index = self.items.iter().position(|i| i.artwork_id == artwork_id)?;
        Some(self.items.remove(index))
    }

    pub fn is_collected(&self, artwork_id: &str) -> bool {
        self.items.iter().any(|i| i.artwork_id == artwork_id)
    }

    pub fn get(&self, artwork_id: &str) -> Option<&CollectedItem> {
        self.items.iter().find(|i| i.artwork_id == artwork_id)
    }

    pub fn items(&self) -> &[CollectedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn stats(&self) -> CollectionStats {
        CollectionStats {
            total_collected: self.items.len(),
            last_collected_at: self.items.iter().map(|i| i.collected_at).max(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoCoordinate;
    use chrono::TimeZone;

    fn item(artwork_id: &str, hour: u32) -> CollectedItem {
        CollectedItem {
            artwork_id: artwork_id.to_string(),
            spot_id: artwork_id.to_string(),
            collected_at: Utc.with_ymd_and_hms(2026, 10, 19, hour, 0, 0).unwrap(),
            location: GeoCoordinate::new(37.6524, 127.6874),
        }
    }

    #[test]
    fn test_collect_twice_keeps_one() {
        let mut collection = Collection::new();

        assert!(collection.collect(item("vivaldi-queen", 9)).is_new());
        assert_eq!(
            collection.collect(item("vivaldi-queen", 10)),
            CollectOutcome::AlreadyCollected
        );

        assert_eq!(collection.len(), 1);
        // The first collection event wins
        assert_eq!(collection.items()[0].collected_at.format("%H").to_string(), "09");
    }

    #[test]
    fn test_remove() {
        let mut collection = Collection::new();
        collection.collect(item("vivaldi-queen", 9));
        collection.collect(item("vivaldi-dodo", 10));

        let removed = collection.remove("vivaldi-queen").unwrap();
        assert_eq!(removed.artwork_id, "vivaldi-queen");
        assert!(!collection.is_collected("vivaldi-queen"));
        assert!(collection.remove("vivaldi-queen").is_none());
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_from_items_drops_duplicates() {
        let collection = Collection::from_items(vec![
            item("vivaldi-queen", 9),
            item("vivaldi-dodo", 10),
            item("vivaldi-queen", 11),
        ]);

        assert_eq!(collection.len(), 2);
        let ids: Vec<_> = collection.items().iter().map(|i| i.artwork_id.as_str()).collect();
        assert_eq!(ids, ["vivaldi-queen", "vivaldi-dodo"]);
    }

    #[test]
    fn test_stats() {
        let mut collection = Collection::new();
        assert_eq!(collection.stats().last_collected_at, None);

        collection.collect(item("vivaldi-queen", 11));
        collection.collect(item("vivaldi-dodo", 9));

        let stats = collection.stats();
        assert_eq!(stats.total_collected, 2);
        assert_eq!(stats.last_collected_at, Some(Utc.with_ymd_and_hms(2026, 10, 19, 11, 0, 0).unwrap()));
    }
}
