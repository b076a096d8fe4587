//! State management module
//!
//! This module handles all application state, including:
//! - Shared data structures (data.rs)
//! - The static art spot catalog (spots.rs)
//! - The user's collection and its persistence (collection.rs, store.rs)
//! - Artwork placement in the virtual room (room.rs)

pub mod collection;
pub mod data;
pub mod room;
pub mod spots;
pub mod store;

pub use collection::{CollectOutcome, Collection, CollectionStats};
pub use data::{ArtSpot, CollectedItem};
pub use room::{PlacedItem, Room};
pub use spots::SpotCatalog;
pub use store::{open_store, CollectionStore, JsonFileStore, MemoryStore, SqliteStore, StoreBackend};
