//! GPS position tracking
//!
//! Location updates are push based: a [`LocationWatch`] runs a
//! [`LocationSource`] on a background task and delivers each fix (or
//! failure) through a channel. The watch must be stopped when its consumer
//! goes away; dropping it stops it as well.
//!
//! Desktop machines have no location service, so the crate ships a
//! [`SimulatedSource`] that replays a scripted track.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::format::Locale;
use crate::geo::GeoCoordinate;

/// Platform timeout for a single fix
pub const DEFAULT_GPS_TIMEOUT: Duration = Duration::from_secs(10);

/// One location fix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub coordinate: GeoCoordinate,
    /// Accuracy radius in meters
    pub accuracy: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            coordinate: GeoCoordinate::new(latitude, longitude),
            accuracy,
        }
    }
}

/// Why a fix could not be obtained
///
/// The `Display` text is the advisory shown to the user.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpsError {
    #[error("Location permission was denied. Allow location access in your settings.")]
    PermissionDenied,

    #[error("Location information is unavailable")]
    PositionUnavailable,

    #[error("Location request timed out")]
    Timeout,

    #[error("This device does not support location services")]
    Unsupported,
}

impl GpsError {
    pub fn advisory(self, locale: Locale) -> String {
        match locale {
            Locale::En => self.to_string(),
            Locale::Ko => match self {
                GpsError::PermissionDenied => {
                    "GPS 권한이 거부되었습니다. 설정에서 위치 권한을 허용해주세요.".to_string()
                }
                GpsError::PositionUnavailable => "GPS 위치 정보를 사용할 수 없습니다".to_string(),
                GpsError::Timeout => "GPS 요청 시간이 초과되었습니다".to_string(),
                GpsError::Unsupported => "GPS를 지원하지 않는 기기입니다".to_string(),
            },
        }
    }
}

/// A fix or the reason there is none
pub type GpsEvent = Result<Position, GpsError>;

/// Location permission as last observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

/// What the view layer knows about GPS right now
#[derive(Debug, Clone, PartialEq)]
pub struct GpsStatus {
    /// Last good fix. Kept when a later update fails.
    pub position: Option<Position>,
    /// No update of any kind received yet
    pub loading: bool,
    pub error: Option<GpsError>,
    pub permission: Option<Permission>,
}

impl Default for GpsStatus {
    fn default() -> Self {
        Self {
            position: None,
            loading: true,
            error: None,
            permission: None,
        }
    }
}

impl GpsStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: &GpsEvent) {
        self.loading = false;
        match event {
            Ok(position) => {
                self.position = Some(*position);
                self.error = None;
                self.permission = Some(Permission::Granted);
            }
            Err(error) => {
                self.error = Some(*error);
                if *error == GpsError::PermissionDenied {
                    self.permission = Some(Permission::Denied);
                }
            }
        }
    }

    pub fn coordinate(&self) -> Option<GeoCoordinate> {
        self.position.map(|p| p.coordinate)
    }

    pub fn is_active(&self) -> bool {
        self.position.is_some() && self.error.is_none()
    }
}

/// Something that produces location fixes
///
/// `next_fix` resolves with the next update, or `None` when the source is
/// exhausted and the watch should end.
pub trait LocationSource: Send + 'static {
    fn next_fix(&mut self) -> impl Future<Output = Option<GpsEvent>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Report [`GpsError::Timeout`] when no update arrives within this long
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_GPS_TIMEOUT,
        }
    }
}

/// A running location subscription
#[derive(Debug)]
pub struct LocationWatch {
    rx: mpsc::Receiver<GpsEvent>,
    handle: Option<JoinHandle<()>>,
}

impl LocationWatch {
    /// Start watching `source` on a background task
    ///
    /// Must be called inside a tokio runtime.
    pub fn start<S: LocationSource>(mut source: S, options: WatchOptions) -> Self {
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            loop {
                let event = match tokio::time::timeout(options.timeout, source.next_fix()).await {
                    Ok(Some(event)) => event,
                    Ok(None) => break,
                    Err(_) => {
                        warn!("📡 No location update within {:?}", options.timeout);
                        Err(GpsError::Timeout)
                    }
                };

                if tx.send(event).await.is_err() {
                    break;
                }
            }
            debug!("📡 Location source finished");
        });

        Self {
            rx,
            handle: Some(handle),
        }
    }

    /// Next update, or `None` once the watch has ended
    pub async fn recv(&mut self) -> Option<GpsEvent> {
        self.rx.recv().await
    }

    /// Tear down the subscription. Pending updates are discarded.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("📡 Location watch stopped");
        }
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }

    pub fn is_stopped(&self) -> bool {
        self.handle.is_none()
    }
}

impl Drop for LocationWatch {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Replays a scripted list of updates, one per `interval`
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    events: VecDeque<GpsEvent>,
    interval: Duration,
}

impl SimulatedSource {
    pub fn new(events: Vec<GpsEvent>, interval: Duration) -> Self {
        Self {
            events: events.into(),
            interval,
        }
    }

    /// Walk in a straight line from `from` to `to` in `steps` equal legs
    ///
    /// Produces `steps + 1` fixes, the first at `from` and the last at `to`.
    pub fn walk(from: GeoCoordinate, to: GeoCoordinate, steps: u32, interval: Duration) -> Self {
        let steps = steps.max(1);
        let events = (0..=steps)
            .map(|i| {
                let coordinate = from.lerp(&to, f64::from(i) / f64::from(steps));
                Ok(Position {
                    coordinate,
                    accuracy: 5.0,
                })
            })
            .collect();

        Self::new(events, interval)
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl LocationSource for SimulatedSource {
    async fn next_fix(&mut self) -> Option<GpsEvent> {
        tokio::time::sleep(self.interval).await;
        self.events.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Never produces anything
    struct SilentSource;

    impl LocationSource for SilentSource {
        async fn next_fix(&mut self) -> Option<GpsEvent> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_status_keeps_last_fix_on_error() {
        let mut status = GpsStatus::new();
        assert!(status.loading);

        status.apply(&Ok(Position::new(37.6524, 127.6874, 8.0)));
        assert!(status.is_active());
        assert_eq!(status.permission, Some(Permission::Granted));

        status.apply(&Err(GpsError::PositionUnavailable));
        assert!(!status.is_active());
        assert_eq!(status.coordinate(), Some(GeoCoordinate::new(37.6524, 127.6874)));
        assert_eq!(status.permission, Some(Permission::Granted));
    }

    #[test]
    fn test_permission_denied_is_recorded() {
        let mut status = GpsStatus::new();
        status.apply(&Err(GpsError::PermissionDenied));

        assert!(!status.loading);
        assert_eq!(status.permission, Some(Permission::Denied));
        assert_eq!(status.position, None);
    }

    #[test]
    fn test_advisories() {
        assert_eq!(GpsError::Timeout.advisory(Locale::En), "Location request timed out");
        assert_eq!(GpsError::Timeout.advisory(Locale::Ko), "GPS 요청 시간이 초과되었습니다");
    }

    #[test]
    fn test_walk_endpoints() {
        let from = GeoCoordinate::new(37.6534, 127.6864);
        let to = GeoCoordinate::new(37.6524, 127.6874);
        let source = SimulatedSource::walk(from, to, 4, Duration::from_secs(1));

        assert_eq!(source.remaining(), 5);
        assert_eq!(source.events.front().unwrap().unwrap().coordinate, from);
        assert_eq!(source.events.back().unwrap().unwrap().coordinate, to);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watch_delivers_track_then_ends() {
        let events = vec![
            Ok(Position::new(37.0, 127.0, 5.0)),
            Err(GpsError::PositionUnavailable),
            Ok(Position::new(37.1, 127.1, 5.0)),
        ];
        let mut watch = LocationWatch::start(
            SimulatedSource::new(events.clone(), Duration::from_secs(1)),
            WatchOptions::default(),
        );

        for expected in events {
            assert_eq!(watch.recv().await, Some(expected));
        }
        assert_eq!(watch.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_source_times_out() {
        let mut watch = LocationWatch::start(
            SilentSource,
            WatchOptions {
                timeout: Duration::from_secs(10),
            },
        );

        assert_eq!(watch.recv().await, Some(Err(GpsError::Timeout)));
        // The watch keeps waiting after a timeout
        assert_eq!(watch.recv().await, Some(Err(GpsError::Timeout)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_delivery() {
        let source = SimulatedSource::walk(
            GeoCoordinate::new(37.0, 127.0),
            GeoCoordinate::new(37.01, 127.01),
            100,
            Duration::from_millis(10),
        );
        let mut watch = LocationWatch::start(source, WatchOptions::default());

        assert!(matches!(watch.recv().await, Some(Ok(_))));
        watch.stop();

        assert!(watch.is_stopped());
        assert_eq!(watch.recv().await, None);
    }
}
