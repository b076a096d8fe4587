//! Art Pick: a location-based art collecting game
//!
//! Visitors walk to art spots, scan the QR code there (or run a simulated
//! scan at virtual spots) and keep the artworks they collect. The crate is
//! headless: [`app::App`] is the view controller and [`runtime::Runtime`]
//! drives it from GPS updates and timers.

pub mod app;
pub mod config;
pub mod error;
pub mod format;
pub mod geo;
pub mod gps;
pub mod proximity;
pub mod runtime;
pub mod scan;
pub mod state;

pub use app::{App, AppSettings, Command, Message, View};
pub use config::Config;
pub use error::{AppError, StoreError};
pub use geo::GeoCoordinate;
pub use runtime::Runtime;
