//! Session binary for the Sukabumi souvenir atlas.
//!
//! Loads every configured map layer, registers the city boundary, and then
//! drives the boundary-gated submission flow over JSON lines on
//! stdin/stdout. Logs go to stderr so they never mix with responses.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `atlas-config.yaml` (or `ATLAS_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Load and ingest all layers
//! 4. Log the atlas summary and boundary extent
//! 5. Run the session until stdin closes

mod error;
mod session;

use std::path::PathBuf;

use atlas_core::config::{AtlasConfig, LoggingConfig};
use atlas_core::loader::Atlas;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::session::Session;

/// Config file used when `ATLAS_CONFIG` is not set.
const DEFAULT_CONFIG_PATH: &str = "atlas-config.yaml";

/// Application entry point for the atlas engine.
///
/// # Errors
///
/// Returns an error if the configuration file is invalid or the session's
/// stdin/stdout fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is configured from it, so this
    //    comes first.
    let (config, config_path, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("atlas-engine starting");
    if from_file {
        info!(path = %config_path.display(), "configuration loaded");
    } else {
        info!(path = %config_path.display(), "config file not found, using defaults");
    }
    info!(
        map = %config.map.name,
        center = %config.map.center,
        zoom = config.map.zoom,
        data_dir = %config.data.data_dir.display(),
        layers = config.data.layers.len(),
        boundary = %config.boundary.layer,
        "atlas configured"
    );

    // 3. Load layers. Nothing reads stdin until this completes.
    let atlas = Atlas::load(&config).await;

    // 4. Summarize.
    let summary = atlas.summary();
    info!(
        layers = summary.layers.len(),
        failed = summary.failed.len(),
        boundaries = summary.boundaries,
        places = summary.points_of_interest,
        "atlas loaded"
    );
    match atlas.boundary_bbox() {
        Some(bbox) => {
            let (south_west, north_east) = bbox.corners();
            info!(%south_west, %north_east, "boundary extent");
        }
        None => warn!(boundary = %atlas.boundary_name(), "boundary extent unavailable"),
    }

    // 5. Run the session.
    let mut session = Session::new(atlas, &config.notification);
    session
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;

    info!("atlas-engine shutdown complete");
    Ok(())
}

/// Load configuration from `ATLAS_CONFIG` or `atlas-config.yaml`.
///
/// A missing file yields defaults (with environment overrides applied).
/// Returns the config, the path consulted, and whether the file existed.
fn load_config() -> Result<(AtlasConfig, PathBuf, bool), EngineError> {
    let path = std::env::var_os("ATLAS_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        let config = AtlasConfig::from_file(&path)?;
        Ok((config, path, true))
    } else {
        let config = AtlasConfig::parse("")?;
        Ok((config, path, false))
    }
}

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if logging.is_json() {
        builder.json().init();
    } else {
        builder.init();
    }
}
