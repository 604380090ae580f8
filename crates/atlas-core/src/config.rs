//! Configuration loading and typed config structures for the atlas.
//!
//! The canonical configuration lives in `atlas-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file. Every section and
//! field has a default, so an empty or missing file yields the stock
//! Sukabumi setup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use atlas_types::{Category, Coordinate};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level atlas configuration.
///
/// Mirrors the structure of `atlas-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AtlasConfig {
    /// Initial map view.
    #[serde(default)]
    pub map: MapConfig,

    /// Where the data layers live and which ones to load.
    #[serde(default)]
    pub data: DataConfig,

    /// Which layer gates point submissions.
    #[serde(default)]
    pub boundary: BoundaryConfig,

    /// Search behavior.
    #[serde(default)]
    pub search: SearchConfig,

    /// How rejected clicks are announced.
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Fallback image per place name, used when a feature has no
    /// `gambar` property.
    #[serde(default)]
    pub images: BTreeMap<String, String>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AtlasConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `ATLAS_DATA_DIR` overrides `data.data_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.data.apply_env_overrides();
        Ok(config)
    }
}

/// Initial map view.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapConfig {
    /// Title shown in the page header.
    #[serde(default = "default_map_name")]
    pub name: String,

    /// Where the map opens before the boundary extent is known.
    #[serde(default = "default_center")]
    pub center: Coordinate,

    /// Initial zoom level.
    #[serde(default = "default_zoom")]
    pub zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            name: default_map_name(),
            center: default_center(),
            zoom: default_zoom(),
        }
    }
}

/// Data layer settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DataConfig {
    /// Directory that layer paths are relative to.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Layers in load order.
    #[serde(default = "default_layers")]
    pub layers: Vec<LayerSource>,
}

impl DataConfig {
    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ATLAS_DATA_DIR") {
            self.data_dir = PathBuf::from(val);
        }
    }

    /// Absolute-or-relative path of a layer file.
    pub fn path_of(&self, layer: &LayerSource) -> PathBuf {
        self.data_dir.join(&layer.path)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            layers: default_layers(),
        }
    }
}

/// One named data resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayerSource {
    /// Human-readable label; also the boundary name for areal layers.
    pub label: String,

    /// File path relative to [`DataConfig::data_dir`].
    pub path: PathBuf,

    /// Category for points whose properties do not say.
    #[serde(default)]
    pub category: Option<Category>,
}

impl LayerSource {
    /// Create a layer entry.
    pub fn new(label: &str, path: &str, category: Option<Category>) -> Self {
        Self {
            label: label.to_owned(),
            path: PathBuf::from(path),
            category,
        }
    }
}

/// Submission boundary settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BoundaryConfig {
    /// Label of the layer holding the administrative boundary.
    #[serde(default = "default_boundary_layer")]
    pub layer: String,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            layer: default_boundary_layer(),
        }
    }
}

/// Search settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchConfig {
    /// Maximum number of hits returned by a name search.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

/// Rejection notification settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotificationConfig {
    /// Message shown when a click lands outside the boundary.
    #[serde(default = "default_outside_message")]
    pub outside_message: String,

    /// Vibration pattern (on, off, on, ...) in milliseconds.
    #[serde(default = "default_vibration_pattern_ms")]
    pub vibration_pattern_ms: Vec<u64>,

    /// How long the alert banner stays visible.
    #[serde(default = "default_alert_display_ms")]
    pub alert_display_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            outside_message: default_outside_message(),
            vibration_pattern_ms: default_vibration_pattern_ms(),
            alert_display_ms: default_alert_display_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl LoggingConfig {
    /// Whether JSON log lines were requested.
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_map_name() -> String {
    "SIG Oleh-Oleh Sukabumi".to_owned()
}

const fn default_center() -> Coordinate {
    Coordinate::new(-6.9205, 106.9289)
}

const fn default_zoom() -> u8 {
    13
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_layers() -> Vec<LayerSource> {
    vec![
        LayerSource::new("Kota Sukabumi", "Kota Sukabumi.geojson", None),
        LayerSource::new("Batas Lokasi", "batas_lokasi.geojson", None),
        LayerSource::new("Makanan Khas", "makanan_khas.geojson", Some(Category::Specialty)),
        LayerSource::new("Kuliner Siap Saji", "kuliner_siap_saji.geojson", Some(Category::Culinary)),
        LayerSource::new("Dessert & Ringan", "dessert_ringan.geojson", Some(Category::Dessert)),
        LayerSource::new("Minuman", "minuman.geojson", Some(Category::Beverage)),
        LayerSource::new("Fasilitas Pendukung", "fasilitas_pendukung.geojson", Some(Category::Facility)),
        LayerSource::new("Rute", "rute.geojson", None),
    ]
}

fn default_boundary_layer() -> String {
    "Kota Sukabumi".to_owned()
}

const fn default_max_results() -> usize {
    8
}

fn default_outside_message() -> String {
    "⚠️ Anda mengklik di luar wilayah Kota Sukabumi!".to_owned()
}

fn default_vibration_pattern_ms() -> Vec<u64> {
    vec![200, 100, 200]
}

const fn default_alert_display_ms() -> u64 {
    3000
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "pretty".to_owned()
}
