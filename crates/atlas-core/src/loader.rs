//! Layer catalog loading and atlas assembly.
//!
//! Every configured layer is read with `tokio::fs`, in configuration order.
//! A layer that cannot be read or parsed is logged and skipped; the rest
//! still load. Each loaded layer is then ingested:
//!
//! - areal features are registered as a boundary named after the layer;
//! - named point features of every layer other than the gating boundary
//!   become points of interest in the [`FeatureStore`].
//!
//! [`Atlas::load`] returns only after every layer has been processed, so the
//! gating boundary is in place before the first click is evaluated.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use atlas_geo::{BBox, BoundaryRegistry, GeoError, Layer, LayerSummary, MapFeature};
use atlas_types::{Coordinate, PointOfInterest};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{AtlasConfig, LayerSource};
use crate::gate::SubmissionGate;
use crate::store::{FeatureStore, StoreError};

/// Errors from loading one layer file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read layer {label} from {}: {source}", path.display())]
    Io {
        /// Layer label.
        label: String,
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a usable `GeoJSON` document.
    #[error("failed to parse layer {label}: {source}")]
    Parse {
        /// Layer label.
        label: String,
        /// Underlying parse error.
        #[source]
        source: GeoError,
    },
}

/// Read and parse one layer file.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be read, or
/// [`LoadError::Parse`] if it is not a `GeoJSON` document.
pub async fn load_layer_file(label: &str, path: &Path) -> Result<Layer, LoadError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            label: label.to_owned(),
            path: path.to_path_buf(),
            source,
        })?;
    Layer::parse(label, &text).map_err(|source| LoadError::Parse {
        label: label.to_owned(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Counts for one loaded layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerReport {
    /// Layer label.
    pub label: String,
    /// Points, routes, areas, and skipped features.
    #[serde(flatten)]
    pub counts: LayerSummary,
}

/// What the atlas holds after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtlasSummary {
    /// Loaded layers in configuration order.
    pub layers: Vec<LayerReport>,
    /// Labels of layers that failed to load.
    pub failed: Vec<String>,
    /// Number of registered boundaries.
    pub boundaries: usize,
    /// Number of stored points of interest.
    pub points_of_interest: usize,
}

// ---------------------------------------------------------------------------
// Atlas
// ---------------------------------------------------------------------------

/// Everything the submission session needs: boundaries, stored points, and
/// the loaded layers.
#[derive(Debug, Clone)]
pub struct Atlas {
    /// Registered boundaries.
    pub registry: BoundaryRegistry,
    /// Stored points of interest.
    pub store: FeatureStore,
    layers: Vec<Layer>,
    failed: Vec<String>,
    boundary_name: String,
}

impl Atlas {
    /// Create an empty atlas gated by the boundary named `boundary_name`.
    pub fn new(boundary_name: impl Into<String>, max_results: usize) -> Self {
        Self {
            registry: BoundaryRegistry::new(),
            store: FeatureStore::with_max_results(max_results),
            layers: Vec::new(),
            failed: Vec::new(),
            boundary_name: boundary_name.into(),
        }
    }

    /// Load every configured layer and ingest it.
    ///
    /// Never fails as a whole: layers that cannot be loaded are recorded in
    /// [`AtlasSummary::failed`] and skipped.
    pub async fn load(config: &AtlasConfig) -> Self {
        let mut atlas = Self::new(config.boundary.layer.clone(), config.search.max_results);
        for source in &config.data.layers {
            let path = config.data.path_of(source);
            match load_layer_file(&source.label, &path).await {
                Ok(layer) => atlas.ingest_layer(source, layer, &config.images),
                Err(e) => {
                    warn!(layer = %source.label, error = %e, "layer skipped");
                    atlas.failed.push(source.label.clone());
                }
            }
        }
        if !atlas.registry.contains(&atlas.boundary_name) {
            warn!(
                boundary = %atlas.boundary_name,
                "gating boundary not loaded, every submission will be rejected"
            );
        }
        atlas
    }

    /// Register a layer's areas as a boundary and store its named points.
    ///
    /// `images` maps a place name to an image reference, used when a point
    /// has no `gambar` property.
    pub fn ingest_layer(
        &mut self,
        source: &LayerSource,
        layer: Layer,
        images: &BTreeMap<String, String>,
    ) {
        self.register_areas(&layer);

        if layer.label != self.boundary_name {
            for (feature, location) in layer.points() {
                self.ingest_point(source, &layer.label, feature, location, images);
            }
        }

        let summary = layer.summary();
        info!(
            layer = %layer.label,
            points = summary.points,
            routes = summary.routes,
            areas = summary.areas,
            skipped = summary.skipped,
            "layer loaded"
        );
        self.layers.push(layer);
    }

    fn register_areas(&mut self, layer: &Layer) {
        if layer.areas().next().is_none() {
            return;
        }
        if let Err(e) = self.registry.load_layer(&layer.label, layer) {
            warn!(layer = %layer.label, error = %e, "boundary not registered");
        }
    }

    fn ingest_point(
        &mut self,
        source: &LayerSource,
        label: &str,
        feature: &MapFeature,
        location: Coordinate,
        images: &BTreeMap<String, String>,
    ) {
        let Some(name) = feature.name() else {
            debug!(layer = label, %location, "unnamed point not stored");
            return;
        };
        let props = &feature.properties;
        let image = props
            .image()
            .or_else(|| images.get(name).map(String::as_str))
            .map(str::to_owned);
        let poi = PointOfInterest::new(
            name,
            feature.category(source.category),
            props.description().unwrap_or_default(),
            location,
        )
        .with_image(image)
        .with_link(props.link().map(str::to_owned))
        .with_main_product(props.main_product().map(str::to_owned))
        .with_rating(props.rating())
        .in_layer(label);

        match self.store.insert(poi) {
            Ok(()) => {}
            Err(StoreError::DuplicateName { existing }) => {
                warn!(layer = label, name, %existing, "duplicate place kept first entry");
            }
            Err(e) => warn!(layer = label, name, error = %e, "place not stored"),
        }
    }

    /// Name of the gating boundary.
    pub fn boundary_name(&self) -> &str {
        &self.boundary_name
    }

    /// A gate over this atlas's boundaries.
    pub const fn gate(&self) -> SubmissionGate<'_> {
        SubmissionGate::new(&self.registry)
    }

    /// Extent of the gating boundary, for fitting the map view.
    pub fn boundary_bbox(&self) -> Option<BBox> {
        self.registry.get(&self.boundary_name).ok()?.bbox()
    }

    /// Loaded layers in configuration order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Counts of what was loaded.
    pub fn summary(&self) -> AtlasSummary {
        AtlasSummary {
            layers: self
                .layers
                .iter()
                .map(|l| LayerReport {
                    label: l.label.clone(),
                    counts: l.summary(),
                })
                .collect(),
            failed: self.failed.clone(),
            boundaries: self.registry.len(),
            points_of_interest: self.store.len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atlas_types::{Category, GateDecision};
    use serde_json::json;

    use super::*;

    fn city_layer() -> Layer {
        Layer::from_value(
            "Kota Sukabumi",
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": { "nama": "Kota Sukabumi" },
                    "geometry": { "type": "Polygon",
                        "coordinates": [[[106.88,-6.96],[106.97,-6.96],[106.97,-6.88],[106.88,-6.88],[106.88,-6.96]]] }
                }]
            }),
        )
        .unwrap()
    }

    fn shops_layer() -> Layer {
        Layer::from_value(
            "Makanan Khas",
            json!({
                "type": "FeatureCollection",
                "features": [
                    { "type": "Feature",
                      "properties": { "nama": "Mochi Kaswari", "deskripsi": "Mochi khas" },
                      "geometry": { "type": "Point", "coordinates": [106.93, -6.92] } },
                    { "type": "Feature",
                      "properties": { "nama": "mochi kaswari" },
                      "geometry": { "type": "Point", "coordinates": [106.94, -6.92] } },
                    { "type": "Feature",
                      "properties": { "nama": "Bakso Pa Hari", "jenis": "makanan", "gambar": "img/bakso.jpg",
                                      "produk_utama": "Bakso urat", "rating": 4.6 },
                      "geometry": { "type": "Point", "coordinates": [106.92, -6.91] } },
                    { "type": "Feature",
                      "properties": {},
                      "geometry": { "type": "Point", "coordinates": [106.92, -6.90] } }
                ]
            }),
        )
        .unwrap()
    }

    #[test]
    fn boundary_layer_registers_without_points() {
        let mut atlas = Atlas::new("Kota Sukabumi", 8);
        let source = LayerSource::new("Kota Sukabumi", "kota.geojson", None);
        atlas.ingest_layer(&source, city_layer(), &BTreeMap::new());

        assert!(atlas.registry.contains("Kota Sukabumi"));
        assert!(atlas.store.is_empty());
        let bbox = atlas.boundary_bbox().unwrap();
        assert!(bbox.contains(Coordinate::new(-6.92, 106.93)));
        assert!(
            atlas
                .gate()
                .evaluate(Coordinate::new(-6.92, 106.93), atlas.boundary_name())
                .is_accepted()
        );
    }

    #[test]
    fn points_are_stored_with_categories_and_images() {
        let mut atlas = Atlas::new("Kota Sukabumi", 8);
        let source = LayerSource::new("Makanan Khas", "khas.geojson", Some(Category::Specialty));
        let mut images = BTreeMap::new();
        images.insert(String::from("Mochi Kaswari"), String::from("img/mochi.jpg"));
        atlas.ingest_layer(&source, shops_layer(), &images);

        assert_eq!(atlas.store.len(), 2);
        let mochi = atlas.store.get("Mochi Kaswari").unwrap();
        assert_eq!(mochi.category, Category::Specialty);
        assert_eq!(mochi.image.as_deref(), Some("img/mochi.jpg"));
        assert_eq!(mochi.location, Coordinate::new(-6.92, 106.93));
        assert_eq!(mochi.source_layer.as_deref(), Some("Makanan Khas"));

        let bakso = atlas.store.get("bakso pa hari").unwrap();
        assert_eq!(bakso.category, Category::Culinary);
        assert_eq!(bakso.image.as_deref(), Some("img/bakso.jpg"));
        assert_eq!(bakso.main_product.as_deref(), Some("Bakso urat"));
        assert_eq!(bakso.rating, Some(4.6));
        assert!(mochi.rating.is_none());
    }

    #[test]
    fn summary_counts_layers() {
        let mut atlas = Atlas::new("Kota Sukabumi", 8);
        atlas.ingest_layer(
            &LayerSource::new("Kota Sukabumi", "kota.geojson", None),
            city_layer(),
            &BTreeMap::new(),
        );
        atlas.ingest_layer(
            &LayerSource::new("Makanan Khas", "khas.geojson", None),
            shops_layer(),
            &BTreeMap::new(),
        );
        let summary = atlas.summary();
        assert_eq!(summary.layers.len(), 2);
        assert_eq!(summary.layers.get(1).unwrap().counts.points, 4);
        assert_eq!(summary.boundaries, 1);
        assert_eq!(summary.points_of_interest, 2);
        assert!(summary.failed.is_empty());
    }

    #[test]
    fn gate_fails_closed_before_boundary_loads() {
        let atlas = Atlas::new("Kota Sukabumi", 8);
        assert!(atlas.boundary_bbox().is_none());
        assert!(matches!(
            atlas
                .gate()
                .evaluate(Coordinate::new(-6.92, 106.93), atlas.boundary_name()),
            GateDecision::Rejected(_)
        ));
    }
}
