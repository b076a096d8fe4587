//! QR scanning
//!
//! Real spots carry a physical QR code linking to an AR experience; it can
//! only be scanned once the user has arrived. Virtual spots have no code:
//! "scanning" them is a timed simulation that completes unless the user
//! navigates away first.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::proximity::ProximityState;
use crate::state::ArtSpot;

/// Host every genuine AR experience link points at
pub const AR_HOST: &str = "swiftxr.site";

/// How long the simulated scan of a virtual spot takes
pub const VIRTUAL_SCAN_DELAY: Duration = Duration::from_millis(3500);

/// How a scan of the target spot proceeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Virtual spot: timed simulation
    Simulated,
    /// Real spot within range: camera scanning
    Camera,
    /// Real spot, but the user has not arrived (or has no fix yet)
    OutOfRange,
}

/// Decide how scanning `spot` works given the current proximity
///
/// `None` proximity means no GPS fix yet and counts as out of range.
pub fn scan_mode(spot: &ArtSpot, proximity: Option<ProximityState>) -> ScanMode {
    if !spot.requires_gps() {
        return ScanMode::Simulated;
    }

    match proximity {
        Some(state) if state.can_scan() => ScanMode::Camera,
        _ => ScanMode::OutOfRange,
    }
}

/// Whether decoded QR text is an AR experience link
///
/// Anything else (a menu, a poster URL) is ignored and scanning continues.
pub fn is_ar_payload(decoded: &str) -> bool {
    decoded.contains(AR_HOST)
}

/// A timer that posts `event` after a delay unless cancelled
///
/// Dropping the handle cancels it too.
#[derive(Debug)]
pub struct DelayedCompletion {
    handle: JoinHandle<()>,
}

impl DelayedCompletion {
    /// Must be called inside a tokio runtime.
    pub fn spawn<T: Send + 'static>(delay: Duration, tx: UnboundedSender<T>, event: T) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver may be gone if the app shut down meanwhile
            let _ = tx.send(event);
        });

        Self { handle }
    }

    pub fn cancel(self) {
        // Drop does the work
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for DelayedCompletion {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            debug!("⏹️  Cancelling pending completion");
            self.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SpotCatalog;
    use tokio::sync::mpsc;

    #[test]
    fn test_scan_modes() {
        let catalog = SpotCatalog::builtin();
        let real = catalog.get("vivaldi-alice-rabbit").unwrap();
        let virtual_spot = catalog.get("vivaldi-cheshire").unwrap();

        assert_eq!(scan_mode(real, Some(ProximityState::Arrived)), ScanMode::Camera);
        assert_eq!(scan_mode(real, Some(ProximityState::Near)), ScanMode::OutOfRange);
        assert_eq!(scan_mode(real, None), ScanMode::OutOfRange);

        // Virtual spots never need a fix
        assert_eq!(scan_mode(virtual_spot, None), ScanMode::Simulated);
        assert_eq!(scan_mode(virtual_spot, Some(ProximityState::Far)), ScanMode::Simulated);
    }

    #[test]
    fn test_ar_payload() {
        assert!(is_ar_payload("https://seoyoung.swiftxr.site/seo-001"));
        assert!(!is_ar_payload("https://example.com/menu"));
        assert!(!is_ar_payload(""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = tokio::time::Instant::now();

        let timer = DelayedCompletion::spawn(VIRTUAL_SCAN_DELAY, tx, "done");

        assert_eq!(rx.recv().await, Some("done"));
        assert!(start.elapsed() >= VIRTUAL_SCAN_DELAY);
        tokio::task::yield_now().await;
        assert!(timer.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_completion_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let timer = DelayedCompletion::spawn(VIRTUAL_SCAN_DELAY, tx, "done");
        tokio::time::sleep(Duration::from_secs(1)).await;
        timer.cancel();

        // The aborted task drops its sender, closing the channel
        assert_eq!(rx.recv().await, None);
    }
}
