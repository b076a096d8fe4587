use thiserror::Error;

/// Failures of a collection store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored collection is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Collection database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by the command line front end
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unknown art spot '{0}'")]
    UnknownSpot(String),

    #[error("'{0}' is not in the collection")]
    NotCollected(String),

    #[error("Could not load spot catalog: {0}")]
    Catalog(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
