use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{debug, warn};

use crate::format::Locale;
use crate::proximity::Thresholds;
use crate::state::StoreBackend;

pub struct Config {
    /// Where the collection is persisted
    pub data_dir: PathBuf,
    pub store: StoreBackend,
    /// Optional JSON spot catalog replacing the built-in one
    pub spots_file: Option<PathBuf>,
    pub thresholds: Thresholds,
    pub virtual_scan_delay: Duration,
    pub toast_duration: Duration,
    pub gps_timeout: Duration,
    pub locale: Locale,
}

impl Config {
    pub fn load() -> Self {
        let defaults = Thresholds::default();

        Self {
            data_dir: var("ARTPICK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_data_dir()),
            store: try_load("ARTPICK_STORE", StoreBackend::Json),
            spots_file: var("ARTPICK_SPOTS_FILE").ok().map(PathBuf::from),
            thresholds: Thresholds {
                // Each spot carries its own scan radius
                scan_radius: defaults.scan_radius,
                near_radius: try_load("ARTPICK_NEAR_RADIUS", defaults.near_radius),
                map_radius: try_load("ARTPICK_MAP_RADIUS", defaults.map_radius),
            },
            virtual_scan_delay: Duration::from_millis(try_load("ARTPICK_VIRTUAL_SCAN_MS", 3500)),
            toast_duration: Duration::from_millis(try_load("ARTPICK_TOAST_MS", 3000)),
            gps_timeout: Duration::from_millis(try_load("ARTPICK_GPS_TIMEOUT_MS", 10_000)),
            locale: try_load("ARTPICK_LOCALE", Locale::Ko),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store: StoreBackend::Json,
            spots_file: None,
            thresholds: Thresholds::default(),
            virtual_scan_delay: Duration::from_millis(3500),
            toast_duration: Duration::from_millis(3000),
            gps_timeout: Duration::from_millis(10_000),
            locale: Locale::Ko,
        }
    }
}

/// Get the directory where the collection should be stored
/// - Linux: ~/.local/share/art-pick
/// - macOS: ~/Library/Application Support/art-pick
/// - Windows: %APPDATA%\art-pick
fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    path.push("art-pick");
    path
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        debug!("{key} not set, using default");
    })
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value '{raw}': {e}, using default {default:?}");
            default
        }),
        Err(()) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names; the process environment is shared
    #[test]
    fn test_try_load_parses_value() {
        env::set_var("ARTPICK_TEST_RADIUS_OK", "42.5");
        assert_eq!(try_load("ARTPICK_TEST_RADIUS_OK", 100.0), 42.5);
    }

    #[test]
    fn test_try_load_falls_back_on_garbage() {
        env::set_var("ARTPICK_TEST_RADIUS_BAD", "far");
        assert_eq!(try_load("ARTPICK_TEST_RADIUS_BAD", 100.0), 100.0);
    }

    #[test]
    fn test_try_load_missing() {
        assert_eq!(try_load("ARTPICK_TEST_NEVER_SET", Locale::En), Locale::En);
    }

    #[test]
    fn test_default_data_dir_is_app_scoped() {
        assert!(default_data_dir().ends_with("art-pick"));
    }
}
