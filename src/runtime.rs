//! Async driver for [`App`]
//!
//! Owns the message channel, the GPS watch and the timers, and turns the
//! [`Command`]s returned by `App::update` into tokio tasks whose results
//! come back as messages.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use crate::app::{App, Command, Message, View};
use crate::gps::LocationWatch;
use crate::scan::{scan_mode, DelayedCompletion, ScanMode};
use crate::state::CollectOutcome;

pub struct Runtime {
    app: App,
    tx: UnboundedSender<Message>,
    rx: UnboundedReceiver<Message>,
    watch: Option<LocationWatch>,
    scan_timer: Option<DelayedCompletion>,
    toast_timer: Option<DelayedCompletion>,
    /// AR experiences opened so far, oldest first
    opened: Vec<String>,
}

impl Runtime {
    pub fn new(app: App, watch: Option<LocationWatch>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        Self {
            app,
            tx,
            rx,
            watch,
            scan_timer: None,
            toast_timer: None,
            opened: Vec::new(),
        }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    /// Sender for messages from outside (camera, UI)
    pub fn sender(&self) -> UnboundedSender<Message> {
        self.tx.clone()
    }

    pub fn opened_experiences(&self) -> &[String] {
        &self.opened
    }

    /// Feed one message to the app and execute what it asks for
    ///
    /// Must be called inside a tokio runtime.
    pub fn dispatch(&mut self, message: Message) {
        for command in self.app.update(message) {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::StartVirtualScan { spot_id, delay } => {
                debug!("⏳ Virtual scan of {spot_id} completes in {delay:?}");
                let event = Message::VirtualScanFinished(spot_id);
                self.scan_timer = Some(DelayedCompletion::spawn(delay, self.tx.clone(), event));
            }
            Command::CancelVirtualScan => {
                self.scan_timer = None;
            }
            Command::OpenArExperience(url) => {
                info!("🔗 Opening AR experience {url}");
                self.opened.push(url);
            }
            Command::DismissToastAfter { id, delay } => {
                // Replacing the timer aborts the one for the previous toast
                let event = Message::DismissToast(id);
                self.toast_timer = Some(DelayedCompletion::spawn(delay, self.tx.clone(), event));
            }
        }
    }

    /// Wait for the next message from the GPS watch or a timer
    ///
    /// Returns `None` once the watch has ended and no virtual scan is
    /// pending, i.e. nothing that matters can arrive anymore.
    pub async fn next_message(&mut self) -> Option<Message> {
        loop {
            if let Ok(message) = self.rx.try_recv() {
                return Some(message);
            }

            let scan_pending = self.app.pending_scan().is_some();
            let Some(watch) = self.watch.as_mut() else {
                if !scan_pending {
                    return None;
                }
                return self.rx.recv().await;
            };

            let ended = tokio::select! {
                Some(message) = self.rx.recv() => return Some(message),
                event = watch.recv() => match event {
                    Some(event) => return Some(Message::Gps(event)),
                    None => true,
                },
            };

            if ended {
                info!("📡 Location updates ended");
                self.watch = None;
            }
        }
    }

    /// Process messages until the source of updates is exhausted
    pub async fn run(&mut self) {
        while let Some(message) = self.next_message().await {
            self.dispatch(message);
        }
    }

    /// Head for `spot_id` and collect it as a visitor would
    ///
    /// Presses scan as soon as it is enabled and, at a real spot, points
    /// the camera at the spot's QR code. Returns the outcome, or `None`
    /// if updates ran out first.
    pub async fn collect_spot(&mut self, spot_id: &str) -> Option<CollectOutcome> {
        self.dispatch(Message::Start);
        self.dispatch(Message::SelectSpot(spot_id.to_string()));
        let spot = self.app.catalog().get(spot_id)?.clone();

        loop {
            // Act on the current screen; only wait for updates when idle
            match self.app.view() {
                View::Collection => return self.app.last_outcome().cloned(),
                View::Map if self.app.scan_enabled() => {
                    self.dispatch(Message::ScanClicked);
                    continue;
                }
                View::QrScan if scan_mode(&spot, self.app.target_proximity()) == ScanMode::Camera => {
                    self.dispatch(Message::QrDecoded(spot.ar_url.clone()));
                    continue;
                }
                _ => {}
            }

            let message = self.next_message().await?;
            self.dispatch(message);
        }
    }

    /// Stop the GPS watch and any pending timers
    pub fn shutdown(&mut self) {
        if let Some(mut watch) = self.watch.take() {
            watch.stop();
        }
        self.scan_timer = None;
        self.toast_timer = None;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::app::AppSettings;
    use crate::format::Locale;
    use crate::geo::GeoCoordinate;
    use crate::gps::{SimulatedSource, WatchOptions};
    use crate::state::{MemoryStore, SpotCatalog};

    fn runtime(watch: Option<LocationWatch>) -> Runtime {
        let settings = AppSettings {
            locale: Locale::En,
            ..AppSettings::default()
        };
        let app = App::new(SpotCatalog::builtin(), Box::new(MemoryStore::new()), settings);
        Runtime::new(app, watch)
    }

    #[tokio::test(start_paused = true)]
    async fn test_virtual_scan_completes_through_timer() {
        let mut rt = runtime(None);
        let start = tokio::time::Instant::now();

        let outcome = rt.collect_spot("vivaldi-cheshire").await;

        assert!(matches!(outcome, Some(CollectOutcome::Collected(_))));
        assert!(start.elapsed() >= Duration::from_millis(3500));
        assert!(rt.opened_experiences().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_virtual_scan_never_collects() {
        let mut rt = runtime(None);
        rt.dispatch(Message::SelectSpot("vivaldi-cheshire".into()));
        rt.dispatch(Message::ScanClicked);
        tokio::time::sleep(Duration::from_secs(1)).await;
        rt.dispatch(Message::Navigate(View::Map));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rt.next_message().await.map_or(true, |m| !matches!(m, Message::VirtualScanFinished(_))));
        assert!(rt.app().collection().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_walk_to_real_spot_collects() {
        let from = GeoCoordinate::new(37.6560, 127.6874);
        let to = GeoCoordinate::new(37.6524, 127.6874);
        let source = SimulatedSource::walk(from, to, 8, Duration::from_secs(1));
        let watch = LocationWatch::start(source, WatchOptions::default());
        let mut rt = runtime(Some(watch));

        let outcome = rt.collect_spot("vivaldi-alice-rabbit").await;

        assert!(matches!(outcome, Some(CollectOutcome::Collected(_))));
        assert_eq!(rt.opened_experiences(), ["https://seoyoung.swiftxr.site/seo-001"]);
        assert!(rt.app().collection().is_collected("vivaldi-alice-rabbit"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_arrival_on_last_fix_still_collects() {
        // One leg: the only in-range fix is also the last one
        let from = GeoCoordinate::new(37.6560, 127.6874);
        let to = GeoCoordinate::new(37.6524, 127.6874);
        let source = SimulatedSource::walk(from, to, 1, Duration::from_secs(1));
        let watch = LocationWatch::start(source, WatchOptions::default());
        let mut rt = runtime(Some(watch));

        let outcome = rt.collect_spot("vivaldi-alice-rabbit").await;

        assert!(matches!(outcome, Some(CollectOutcome::Collected(_))));
        assert_eq!(rt.app().view(), View::Collection);
        assert_eq!(rt.opened_experiences(), ["https://seoyoung.swiftxr.site/seo-001"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_walk_that_stops_short_collects_nothing() {
        let from = GeoCoordinate::new(37.6560, 127.6874);
        let to = GeoCoordinate::new(37.6540, 127.6874);
        let source = SimulatedSource::walk(from, to, 4, Duration::from_secs(1));
        let watch = LocationWatch::start(source, WatchOptions::default());
        let mut rt = runtime(Some(watch));

        assert_eq!(rt.collect_spot("vivaldi-alice-rabbit").await, None);
        assert_eq!(rt.app().target_proximity(), Some(crate::proximity::ProximityState::Near));
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_is_dismissed_after_duration() {
        let mut rt = runtime(None);
        rt.dispatch(Message::NavigateToSpot("vivaldi-queen".into()));
        assert!(rt.app().toast().is_some());

        tokio::time::sleep(Duration::from_millis(3100)).await;
        let message = rt.rx.recv().await.unwrap();
        rt.dispatch(message);
        assert!(rt.app().toast().is_none());
    }
}
