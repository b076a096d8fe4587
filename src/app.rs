//! View controller
//!
//! Elm-style application state: the runtime feeds [`Message`]s into
//! [`App::update`], which mutates state and returns [`Command`]s for the
//! runtime to execute (timers, opening links). All state is readable as
//! plain data; nothing calls back into the view layer.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::format::{format_distance, Locale};
use crate::geo::distance_meters;
use crate::gps::{GpsEvent, GpsStatus};
use crate::proximity::{classify, ProximityState, Thresholds};
use crate::scan::{is_ar_payload, scan_mode, ScanMode};
use crate::state::{ArtSpot, CollectOutcome, CollectedItem, Collection, CollectionStore, Room, SpotCatalog};

/// Screens of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Map,
    QrScan,
    Collection,
    MyRoom,
}

/// Application messages (events)
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// "Start" on the home screen
    Start,
    /// Header navigation
    Navigate(View),
    /// User tapped a spot marker
    SelectSpot(String),
    /// User pressed the scan button for the target spot
    ScanClicked,
    /// The camera decoded a QR code
    QrDecoded(String),
    /// The simulated scan of a virtual spot finished
    VirtualScanFinished(String),
    RemoveFromCollection(String),
    /// Show the spot of a collected artwork on the map
    NavigateToSpot(String),
    /// Debug reset of the whole collection
    ClearCollection,
    PlaceInRoom(String),
    RemoveFromRoom(String),
    /// A location update from the GPS watch
    Gps(GpsEvent),
    DismissToast(u64),
}

/// Side effects requested by [`App::update`]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Post `VirtualScanFinished(spot_id)` after `delay`
    StartVirtualScan { spot_id: String, delay: Duration },
    /// Abort the pending virtual scan timer
    CancelVirtualScan,
    /// Open the AR experience linked from a QR code
    OpenArExperience(String),
    /// Post `DismissToast(id)` after `delay`
    DismissToastAfter { id: u64, delay: Duration },
}

/// Short notification shown over the current screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub title: String,
    pub message: String,
}

/// Tunables of the view controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppSettings {
    pub thresholds: Thresholds,
    pub locale: Locale,
    pub virtual_scan_delay: Duration,
    pub toast_duration: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for AppSettings {
    fn from(config: &Config) -> Self {
        Self {
            thresholds: config.thresholds,
            locale: config.locale,
            virtual_scan_delay: config.virtual_scan_delay,
            toast_duration: config.toast_duration,
        }
    }
}

/// A spot as the map shows it
#[derive(Debug, Clone, PartialEq)]
pub struct SpotView<'a> {
    pub spot: &'a ArtSpot,
    /// Meters from the user; `None` until the first fix
    pub distance: Option<f64>,
    pub proximity: Option<ProximityState>,
    pub on_map: bool,
    pub collected: bool,
    pub is_target: bool,
}

impl SpotView<'_> {
    /// "350m", or `None` while the distance is still being computed
    pub fn distance_label(&self) -> Option<String> {
        self.distance.map(format_distance)
    }
}

/// Main application state
pub struct App {
    catalog: SpotCatalog,
    store: Box<dyn CollectionStore>,
    settings: AppSettings,

    view: View,
    collection: Collection,
    room: Room,
    gps: GpsStatus,
    /// Spot ID the user is heading to
    target: Option<String>,
    /// Spot ID of the running virtual scan
    pending_scan: Option<String>,
    toast: Option<Toast>,
    next_toast_id: u64,
    last_outcome: Option<CollectOutcome>,
    last_proximity: Option<ProximityState>,
}

impl App {
    /// Create the controller and load the persisted collection
    ///
    /// An unreadable store is logged and treated as an empty collection.
    pub fn new(catalog: SpotCatalog, store: Box<dyn CollectionStore>, settings: AppSettings) -> Self {
        let collection = match store.load() {
            Ok(Some(items)) => Collection::from_items(items),
            Ok(None) => Collection::new(),
            Err(e) => {
                error!("Failed to load collection, starting empty: {e}");
                Collection::new()
            }
        };

        info!(
            "🎨 Art Pick initialized with {} spots, {} artworks collected",
            catalog.len(),
            collection.len()
        );

        Self {
            catalog,
            store,
            settings,
            view: View::Home,
            collection,
            room: Room::new(),
            gps: GpsStatus::new(),
            target: None,
            pending_scan: None,
            toast: None,
            next_toast_id: 0,
            last_outcome: None,
            last_proximity: None,
        }
    }

    /// Handle application messages and update state
    pub fn update(&mut self, message: Message) -> Vec<Command> {
        match message {
            Message::Start => self.navigate(View::Map),
            Message::Navigate(View::QrScan) => self.update(Message::ScanClicked),
            Message::Navigate(view) => self.navigate(view),
            Message::SelectSpot(spot_id) => self.select_spot(&spot_id),
            Message::ScanClicked => self.scan_clicked(),
            Message::QrDecoded(text) => self.qr_decoded(text),
            Message::VirtualScanFinished(spot_id) => self.virtual_scan_finished(&spot_id),
            Message::RemoveFromCollection(artwork_id) => self.remove_from_collection(&artwork_id),
            Message::NavigateToSpot(artwork_id) => self.navigate_to_spot(&artwork_id),
            Message::ClearCollection => self.clear_collection(),
            Message::PlaceInRoom(artwork_id) => {
                if self.collection.is_collected(&artwork_id) {
                    let placed = self.room.place(&artwork_id);
                    debug!("🖼️  Placed {} at ({:.0}%, {:.0}%)", placed.artwork_id, placed.x, placed.y);
                } else {
                    debug!("Ignoring placement of uncollected artwork {artwork_id}");
                }
                Vec::new()
            }
            Message::RemoveFromRoom(uid) => {
                self.room.remove(&uid);
                Vec::new()
            }
            Message::Gps(event) => self.gps_update(event),
            Message::DismissToast(id) => {
                // A newer toast may have replaced the one this timer was for
                if self.toast.as_ref().is_some_and(|t| t.id == id) {
                    self.toast = None;
                }
                Vec::new()
            }
        }
    }

    // ========== Accessors ==========

    pub fn view(&self) -> View {
        self.view
    }

    pub fn catalog(&self) -> &SpotCatalog {
        &self.catalog
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn gps(&self) -> &GpsStatus {
        &self.gps
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn locale(&self) -> Locale {
        self.settings.locale
    }

    pub fn pending_scan(&self) -> Option<&str> {
        self.pending_scan.as_deref()
    }

    /// Result of the most recent collection attempt
    pub fn last_outcome(&self) -> Option<&CollectOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn target_spot(&self) -> Option<&ArtSpot> {
        self.target.as_deref().and_then(|id| self.catalog.get(id))
    }

    /// Meters between the user and the target spot
    pub fn target_distance(&self) -> Option<f64> {
        let spot = self.target_spot()?;
        let user = self.gps.coordinate()?;
        Some(distance_meters(&user, &spot.coordinate))
    }

    pub fn target_proximity(&self) -> Option<ProximityState> {
        let spot = self.target_spot()?;
        let distance = self.target_distance()?;
        Some(classify(distance, &self.thresholds_for(spot)))
    }

    /// Whether the scan button for the target spot is enabled
    pub fn scan_enabled(&self) -> bool {
        self.target_spot()
            .is_some_and(|spot| scan_mode(spot, self.target_proximity()) != ScanMode::OutOfRange)
    }

    /// Status line under the target spot, e.g. "Almost there! Keep walking"
    pub fn target_message(&self) -> Option<&'static str> {
        let spot = self.target_spot()?;
        if !spot.requires_gps() {
            return None;
        }
        let proximity = self.target_proximity().unwrap_or(ProximityState::Far);
        Some(proximity.info().message_for(self.settings.locale))
    }

    /// Every spot with its live distance, in catalog order
    pub fn spot_views(&self) -> Vec<SpotView<'_>> {
        let user = self.gps.coordinate();

        self.catalog
            .spots()
            .iter()
            .map(|spot| {
                let distance = user.map(|u| distance_meters(&u, &spot.coordinate));
                SpotView {
                    spot,
                    distance,
                    proximity: distance.map(|d| classify(d, &self.thresholds_for(spot))),
                    on_map: distance.map_or(true, |d| self.settings.thresholds.is_on_map(d)),
                    collected: self.collection.is_collected(&spot.artwork_id),
                    is_target: self.target.as_deref() == Some(spot.id.as_str()),
                }
            })
            .collect()
    }

    // ========== Handlers ==========

    fn thresholds_for(&self, spot: &ArtSpot) -> Thresholds {
        self.settings.thresholds.with_scan_radius(spot.radius)
    }

    fn navigate(&mut self, view: View) -> Vec<Command> {
        let mut commands = Vec::new();

        if self.view == View::QrScan && view != View::QrScan {
            if let Some(spot_id) = self.pending_scan.take() {
                debug!("Leaving scanner, cancelling virtual scan of {spot_id}");
                commands.push(Command::CancelVirtualScan);
            }
        }

        self.view = view;
        commands
    }

    fn select_spot(&mut self, spot_id: &str) -> Vec<Command> {
        if self.catalog.get(spot_id).is_none() {
            warn!("Ignoring selection of unknown spot {spot_id}");
            return Vec::new();
        }

        self.target = Some(spot_id.to_string());
        self.last_proximity = self.target_proximity();
        self.navigate(View::Map)
    }

    fn scan_clicked(&mut self) -> Vec<Command> {
        if self.view == View::QrScan {
            return Vec::new();
        }
        let Some(spot) = self.target_spot().cloned() else {
            debug!("Scan pressed without a target spot");
            return Vec::new();
        };

        match scan_mode(&spot, self.target_proximity()) {
            ScanMode::OutOfRange => {
                let (title, message) = text::out_of_range(
                    self.settings.locale,
                    spot.radius,
                    self.target_distance(),
                );
                vec![self.show_toast(title, message)]
            }
            ScanMode::Camera => {
                info!("📷 Scanning QR code at {}", spot.id);
                self.navigate(View::QrScan)
            }
            ScanMode::Simulated => {
                let mut commands = self.navigate(View::QrScan);
                info!("✨ Simulating scan of virtual spot {}", spot.id);
                self.pending_scan = Some(spot.id.clone());
                commands.push(Command::StartVirtualScan {
                    spot_id: spot.id,
                    delay: self.settings.virtual_scan_delay,
                });
                commands
            }
        }
    }

    fn qr_decoded(&mut self, text: String) -> Vec<Command> {
        if self.view != View::QrScan {
            return Vec::new();
        }
        let Some(spot) = self.target_spot().cloned() else {
            return Vec::new();
        };
        if scan_mode(&spot, self.target_proximity()) != ScanMode::Camera {
            debug!("Ignoring QR code, camera scanning is not active");
            return Vec::new();
        }
        if !is_ar_payload(&text) {
            debug!("Ignoring QR code that is not an AR link: {text}");
            return Vec::new();
        }

        let mut commands = vec![Command::OpenArExperience(text)];
        commands.extend(self.collect(&spot));
        commands
    }

    fn virtual_scan_finished(&mut self, spot_id: &str) -> Vec<Command> {
        if self.view != View::QrScan || self.pending_scan.as_deref() != Some(spot_id) {
            debug!("Dropping stale virtual scan completion for {spot_id}");
            return Vec::new();
        }
        self.pending_scan = None;

        match self.catalog.get(spot_id).cloned() {
            Some(spot) => self.collect(&spot),
            None => Vec::new(),
        }
    }

    /// Record a successful scan and move to the collection screen
    fn collect(&mut self, spot: &ArtSpot) -> Vec<Command> {
        let location = self.gps.coordinate().unwrap_or(spot.coordinate);
        let item = CollectedItem::new(spot, location, Utc::now());
        let locale = self.settings.locale;
        let title = spot.display_title(locale).to_string();

        let outcome = self.collection.collect(item);
        let (toast_title, toast_message) = match &outcome {
            CollectOutcome::Collected(item) => {
                info!("🎉 Collected {} at {}", item.artwork_id, item.spot_id);
                self.persist();
                if spot.is_active {
                    text::collected_real(locale, &title)
                } else {
                    text::collected_virtual(locale, &title)
                }
            }
            CollectOutcome::AlreadyCollected => {
                info!("{} is already in the collection", spot.artwork_id);
                text::already_collected(locale)
            }
        };
        self.last_outcome = Some(outcome);

        let mut commands = vec![self.show_toast(toast_title, toast_message)];
        commands.extend(self.navigate(View::Collection));
        commands
    }

    fn remove_from_collection(&mut self, artwork_id: &str) -> Vec<Command> {
        if self.collection.remove(artwork_id).is_none() {
            debug!("Nothing to remove for {artwork_id}");
            return Vec::new();
        }

        let unplaced = self.room.remove_artwork(artwork_id);
        info!("🗑️  Removed {artwork_id} from collection ({unplaced} room placements)");
        self.persist();

        let (title, message) = text::removed(self.settings.locale);
        vec![self.show_toast(title, message)]
    }

    fn navigate_to_spot(&mut self, artwork_id: &str) -> Vec<Command> {
        let Some(spot) = self.catalog.by_artwork(artwork_id) else {
            warn!("No spot hosts artwork {artwork_id}");
            return Vec::new();
        };
        let spot_id = spot.id.clone();
        let (title, message) = text::shown_on_map(self.settings.locale, spot.display_title(self.settings.locale));

        let mut commands = self.select_spot(&spot_id);
        commands.push(self.show_toast(title, message));
        commands
    }

    fn clear_collection(&mut self) -> Vec<Command> {
        self.collection.clear();
        self.room.clear();
        if let Err(e) = self.store.clear() {
            error!("Failed to clear stored collection: {e}");
        }
        info!("🧹 Collection cleared");
        Vec::new()
    }

    fn gps_update(&mut self, event: GpsEvent) -> Vec<Command> {
        let previous_error = self.gps.error;
        self.gps.apply(&event);

        match event {
            Ok(position) => {
                debug!(
                    "📍 Position {:.5}, {:.5} (±{:.0}m)",
                    position.coordinate.latitude, position.coordinate.longitude, position.accuracy
                );

                let proximity = self.target_proximity();
                if proximity != self.last_proximity {
                    if let (Some(spot), Some(state), Some(distance)) =
                        (self.target_spot(), proximity, self.target_distance())
                    {
                        info!(
                            "🧭 {}: {} ({})",
                            spot.id,
                            state.info().label,
                            format_distance(distance)
                        );
                    }
                    self.last_proximity = proximity;
                }
                Vec::new()
            }
            Err(e) => {
                warn!("📡 GPS error: {e}");
                // Only announce a new kind of failure
                if previous_error == Some(e) {
                    return Vec::new();
                }
                let (title, message) = text::gps_error(self.settings.locale, e);
                vec![self.show_toast(title, message)]
            }
        }
    }

    /// Save the collection; failures are logged and the in-memory
    /// collection stays authoritative
    fn persist(&self) {
        if let Err(e) = self.store.save(self.collection.items()) {
            error!("Failed to save collection: {e}");
        }
    }

    fn show_toast(&mut self, title: String, message: String) -> Command {
        self.next_toast_id += 1;
        let id = self.next_toast_id;
        self.toast = Some(Toast { id, title, message });

        Command::DismissToastAfter {
            id,
            delay: self.settings.toast_duration,
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("view", &self.view)
            .field("target", &self.target)
            .field("collected", &self.collection.len())
            .finish()
    }
}

/// Toast texts
mod text {
    use crate::format::{format_distance, Locale};
    use crate::gps::GpsError;

    pub fn collected_real(locale: Locale, title: &str) -> (String, String) {
        match locale {
            Locale::En => ("🎉 Artwork collected!".into(), format!("You got {title}!")),
            Locale::Ko => ("🎉 실제 작품 수집!".into(), format!("{title}을(를) 획득했습니다!")),
        }
    }

    pub fn collected_virtual(locale: Locale, title: &str) -> (String, String) {
        match locale {
            Locale::En => (
                "✨ Virtual experience complete".into(),
                format!("{title} was added to your collection."),
            ),
            Locale::Ko => ("✨ 가상 체험 완료".into(), format!("{title} 체험이 추가되었습니다.")),
        }
    }

    pub fn already_collected(locale: Locale) -> (String, String) {
        match locale {
            Locale::En => (
                "Already collected".into(),
                "This artwork is already in your collection.".into(),
            ),
            Locale::Ko => ("이미 수집함".into(), "이 작품은 이미 컬렉션에 있습니다.".into()),
        }
    }

    pub fn removed(locale: Locale) -> (String, String) {
        match locale {
            Locale::En => ("Removed".into(), "Removed from your collection.".into()),
            Locale::Ko => ("삭제 완료".into(), "컬렉션에서 제거되었습니다.".into()),
        }
    }

    pub fn shown_on_map(locale: Locale, title: &str) -> (String, String) {
        match locale {
            Locale::En => ("Location shown".into(), format!("{title} is marked on the map.")),
            Locale::Ko => ("위치 표시".into(), format!("{title}의 위치를 지도에 표시했습니다")),
        }
    }

    pub fn out_of_range(locale: Locale, radius: f64, distance: Option<f64>) -> (String, String) {
        let radius = format_distance(radius);
        match (locale, distance) {
            (Locale::En, Some(d)) => (
                "Out of range".into(),
                format!("{} away. Move within {radius} of the artwork.", format_distance(d)),
            ),
            (Locale::En, None) => (
                "Out of range".into(),
                format!("Waiting for GPS. Move within {radius} of the artwork."),
            ),
            (Locale::Ko, Some(d)) => (
                "위치 범위 밖".into(),
                format!("{} | 작품 위치에서 {radius} 이내로 이동해주세요", format_distance(d)),
            ),
            (Locale::Ko, None) => (
                "위치 범위 밖".into(),
                format!("GPS 확인 중... 작품 위치에서 {radius} 이내로 이동해주세요"),
            ),
        }
    }

    pub fn gps_error(locale: Locale, error: GpsError) -> (String, String) {
        let title = match locale {
            Locale::En => "⚠️ GPS error",
            Locale::Ko => "⚠️ GPS 오류",
        };
        (title.into(), error.advisory(locale))
    }
}
