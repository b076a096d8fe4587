//! Collection persistence
//!
//! The view controller never touches storage directly; it is handed a
//! [`CollectionStore`] and calls `load` once at startup and `save` after
//! every change. Three implementations:
//! - [`JsonFileStore`]: the collection as one JSON document on disk
//! - [`SqliteStore`]: a row per item in a SQLite catalog
//! - [`MemoryStore`]: in-memory fake for tests

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use rusqlite::{params, Connection};
use tracing::{debug, info};

use super::data::CollectedItem;
use crate::error::StoreError;
use crate::geo::GeoCoordinate;

/// File name of the JSON collection document
pub const JSON_FILE_NAME: &str = "art-collection.json";
/// File name of the SQLite catalog
pub const DB_FILE_NAME: &str = "art_pick.db";

/// Persistence for the collected items of one device
///
/// Single writer, no contention model. `load` returns `None` when nothing
/// has ever been saved.
pub trait CollectionStore {
    fn load(&self) -> Result<Option<Vec<CollectedItem>>, StoreError>;
    fn save(&self, items: &[CollectedItem]) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Which store implementation to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Json,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(StoreBackend::Json),
            "sqlite" => Ok(StoreBackend::Sqlite),
            other => Err(format!("unknown store '{other}' (expected 'json' or 'sqlite')")),
        }
    }
}

/// Open the configured store inside `data_dir`
pub fn open_store(backend: StoreBackend, data_dir: &Path) -> Result<Box<dyn CollectionStore>, StoreError> {
    match backend {
        StoreBackend::Json => Ok(Box::new(JsonFileStore::new(data_dir.join(JSON_FILE_NAME)))),
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::open(data_dir.join(DB_FILE_NAME))?)),
    }
}

// ========== JSON file ==========

/// Stores the collection as a JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CollectionStore for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<CollectedItem>>, StoreError> {
        if !self.path.exists() {
            debug!("No collection file at {}", self.path.display());
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let items: Vec<CollectedItem> = serde_json::from_str(&json)?;
        Ok(Some(items))
    }

    fn save(&self, items: &[CollectedItem]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write next to the target, then rename over it
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec_pretty(items)?)?;
        fs::rename(&tmp_path, &self.path)?;

        debug!("💾 Saved {} items to {}", items.len(), self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ========== SQLite ==========

/// Stores the collection in a SQLite database, one row per item.
///
/// Whether anything was ever saved is tracked in `PRAGMA user_version`
/// so that an empty saved collection and "never saved" stay distinct.
pub struct SqliteStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create the database at `db_path`
    pub fn open(db_path: PathBuf) -> Result<Self, StoreError> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&db_path)?;
        info!("📁 Collection database at: {}", db_path.display());

        let store = SqliteStore {
            conn,
            db_path: Some(db_path),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Database that lives only as long as this value
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = SqliteStore {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Path of the database file (`None` for in-memory databases)
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        // `position` keeps collection order stable across saves
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS collection (
                artwork_id      TEXT PRIMARY KEY,
                spot_id         TEXT NOT NULL,
                collected_at    TEXT NOT NULL,
                latitude        REAL NOT NULL,
                longitude       REAL NOT NULL,
                position        INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_collection_position
             ON collection(position)",
            [],
        )?;

        Ok(())
    }

    fn saved_version(&self) -> rusqlite::Result<i64> {
        self.conn.query_row("PRAGMA user_version", [], |row| row.get(0))
    }
}

impl CollectionStore for SqliteStore {
    fn load(&self) -> Result<Option<Vec<CollectedItem>>, StoreError> {
        if self.saved_version()? == 0 {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            "SELECT artwork_id, spot_id, collected_at, latitude, longitude
             FROM collection
             ORDER BY position",
        )?;

        let items = stmt
            .query_map([], |row| {
                Ok(CollectedItem {
                    artwork_id: row.get(0)?,
                    spot_id: row.get(1)?,
                    collected_at: row.get(2)?,
                    location: GeoCoordinate::new(row.get(3)?, row.get(4)?),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(items))
    }

    fn save(&self, items: &[CollectedItem]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute("DELETE FROM collection", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO collection (artwork_id, spot_id, collected_at, latitude, longitude, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (position, item) in items.iter().enumerate() {
                insert.execute(params![
                    item.artwork_id,
                    item.spot_id,
                    item.collected_at,
                    item.location.latitude,
                    item.location.longitude,
                    position as i64,
                ])?;
            }
        }
        tx.execute_batch("PRAGMA user_version = 1")?;
        tx.commit()?;

        debug!("💾 Saved {} items to collection database", items.len());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "DELETE FROM collection;
             PRAGMA user_version = 0;",
        )?;
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

// ========== In-memory ==========

#[derive(Debug, Default)]
struct MemoryInner {
    saved: Option<Vec<CollectedItem>>,
    fail_saves: bool,
    save_count: usize,
}

/// In-memory store. Clones share the same contents, so a test can keep a
/// handle while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `items`
    pub fn with_items(items: Vec<CollectedItem>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.saved = Some(items);
        }
        store
    }

    /// Make every following `save` fail, as a full disk would
    pub fn set_fail_saves(&self, fail: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.fail_saves = fail;
        }
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.save_count).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl CollectionStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<CollectedItem>>, StoreError> {
        Ok(self.lock()?.saved.clone())
    }

    fn save(&self, items: &[CollectedItem]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.fail_saves {
            return Err(StoreError::Unavailable("storage quota exceeded".to_string()));
        }
        inner.saved = Some(items.to_vec());
        inner.save_count += 1;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.lock()?.saved = None;
        Ok(())
    }
}
