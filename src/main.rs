//! Art Pick CLI
//!
//! Browse the spot catalog, simulate a walk to a spot and manage the
//! collection stored on this device.

use std::time::Duration;

use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use art_pick::format::{format_collected_date, format_distance, relative_time};
use art_pick::gps::{LocationWatch, SimulatedSource, WatchOptions};
use art_pick::proximity::classify;
use art_pick::state::{open_store, CollectOutcome, SpotCatalog};
use art_pick::{App, AppError, AppSettings, Config, GeoCoordinate, Message, Runtime};

#[derive(Parser)]
#[command(name = "art-pick")]
#[command(about = "Collect artworks by walking to art spots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List art spots, with distances when a position is given.
    Spots {
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },

    /// Walk to a spot along a simulated GPS track and collect its artwork.
    Walk {
        /// Spot ID, e.g. vivaldi-alice-rabbit
        spot: String,
        /// Start latitude (default: 400m north of the spot)
        #[arg(long, allow_hyphen_values = true)]
        from_lat: Option<f64>,
        /// Start longitude (default: the spot's longitude)
        #[arg(long, allow_hyphen_values = true)]
        from_lng: Option<f64>,
        /// Number of legs in the track
        #[arg(long, default_value = "8")]
        steps: u32,
        /// Time between GPS fixes
        #[arg(long, default_value = "500")]
        interval_ms: u64,
    },

    /// Show the collected artworks.
    Collection,

    /// Remove an artwork from the collection.
    Remove {
        /// Artwork ID
        artwork: String,
    },

    /// Delete the whole collection.
    Clear,
}

/// About 400m of latitude
const DEFAULT_APPROACH_DEGREES: f64 = 0.0036;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_filter = if cli.verbose { "art_pick=debug" } else { "art_pick=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load();

    let catalog = match &config.spots_file {
        Some(path) => SpotCatalog::from_json_file(path)?,
        None => SpotCatalog::builtin(),
    };

    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        error!("Failed to create data directory {}: {e}", config.data_dir.display());
    }
    let store = open_store(config.store, &config.data_dir)?;
    info!("📁 Collection stored in {}", config.data_dir.display());

    match cli.command {
        Commands::Spots { lat, lng } => {
            let user = lat.zip(lng).map(|(lat, lng)| GeoCoordinate::new(lat, lng));
            print_spots(&catalog, &config, user);
        }

        Commands::Walk {
            spot,
            from_lat,
            from_lng,
            steps,
            interval_ms,
        } => {
            let target = catalog.get(&spot).ok_or_else(|| AppError::UnknownSpot(spot.clone()))?;
            let from = GeoCoordinate::new(
                from_lat.unwrap_or(target.coordinate.latitude + DEFAULT_APPROACH_DEGREES),
                from_lng.unwrap_or(target.coordinate.longitude),
            );

            println!("🚶 Walking to {} ({})", target.title, target.id);
            let source = SimulatedSource::walk(from, target.coordinate, steps, Duration::from_millis(interval_ms));
            let watch = LocationWatch::start(
                source,
                WatchOptions {
                    timeout: config.gps_timeout,
                },
            );

            let app = App::new(catalog.clone(), store, AppSettings::from(&config));
            let mut runtime = Runtime::new(app, Some(watch));
            let outcome = runtime.collect_spot(&spot).await;

            match outcome {
                Some(CollectOutcome::Collected(item)) => {
                    println!("🎉 Collected {} at {}", item.artwork_id, item.spot_id);
                }
                Some(CollectOutcome::AlreadyCollected) => {
                    println!("Already in your collection: {}", target.artwork_id);
                }
                None => {
                    let distance = runtime.app().target_distance().map(format_distance);
                    println!(
                        "❌ Could not collect {}: still {} away",
                        target.id,
                        distance.as_deref().unwrap_or("an unknown distance")
                    );
                }
            }
            for url in runtime.opened_experiences() {
                println!("🔗 AR experience: {url}");
            }
            runtime.shutdown();
        }

        Commands::Collection => {
            let app = App::new(catalog, store, AppSettings::from(&config));
            print_collection(&app);
        }

        Commands::Remove { artwork } => {
            let mut app = App::new(catalog, store, AppSettings::from(&config));
            if !app.collection().is_collected(&artwork) {
                return Err(AppError::NotCollected(artwork));
            }
            app.update(Message::RemoveFromCollection(artwork.clone()));
            println!("🗑️  Removed {artwork}");
        }

        Commands::Clear => {
            store.clear()?;
            println!("🧹 Collection cleared");
        }
    }

    Ok(())
}

fn print_spots(catalog: &SpotCatalog, config: &Config, user: Option<GeoCoordinate>) {
    for spot in catalog.spots() {
        let (marker, kind) = if spot.is_active { ("📍", "QR") } else { ("✨", "virtual") };
        let title = spot.display_title(config.locale);

        match user {
            Some(user) => {
                let distance = user.distance_to(&spot.coordinate);
                let state = classify(distance, &config.thresholds.with_scan_radius(spot.radius));
                println!(
                    "{} {:<22} {:<16} {:>8}  {}  [{kind}]",
                    marker,
                    spot.id,
                    title,
                    format_distance(distance),
                    state.info().label_for(config.locale)
                );
            }
            None => println!("{} {:<22} {:<16} [{kind}]", marker, spot.id, title),
        }
    }
}

fn print_collection(app: &App) {
    let collection = app.collection();
    if collection.is_empty() {
        println!("No artworks collected yet");
        return;
    }

    let locale = app.locale();
    let now = Utc::now();
    for item in collection.items() {
        let title = app
            .catalog()
            .by_artwork(&item.artwork_id)
            .map_or(item.artwork_id.as_str(), |spot| spot.display_title(locale));
        println!(
            "🖼️  {:<16} {}  ({})",
            title,
            format_collected_date(&item.collected_at.with_timezone(&Local), locale),
            relative_time(&item.collected_at, &now, locale)
        );
    }

    let stats = collection.stats();
    println!("Total: {}", stats.total_collected);
}
