//! Named boundaries and the registry that owns them.
//!
//! A [`Boundary`] is immutable once built. The [`BoundaryRegistry`] is the
//! only owner; callers borrow boundaries and never receive a mutable handle.

use std::collections::BTreeMap;

use geo_types::Polygon;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::GeoError;
use crate::geometry::{BBox, Shape};
use crate::layer::Layer;

/// A named polygonal region used as a containment target.
///
/// Multipolygons are flattened on construction, so the boundary is simply
/// the union of its polygons. A boundary with no polygons contains nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    name: String,
    polygons: Vec<Polygon<f64>>,
}

impl Boundary {
    /// Build a boundary from areal shapes.
    pub fn from_shapes<'a>(
        name: impl Into<String>,
        shapes: impl IntoIterator<Item = &'a Shape>,
    ) -> Self {
        let polygons = shapes
            .into_iter()
            .flat_map(Shape::parts)
            .map(|p| p.to_polygon())
            .collect();
        Self {
            name: name.into(),
            polygons,
        }
    }

    /// Build a boundary from every polygon and multipolygon in a layer.
    /// Points and lines in the layer are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::GeometryLoad`] if the layer has no areal features.
    pub fn from_layer(name: impl Into<String>, layer: &Layer) -> Result<Self, GeoError> {
        let boundary = Self::from_shapes(name, layer.areas());
        if boundary.is_empty() {
            return Err(GeoError::GeometryLoad {
                name: boundary.name,
                reason: format!(
                    "layer {} has no polygon features ({} skipped as malformed)",
                    layer.label, layer.skipped
                ),
            });
        }
        Ok(boundary)
    }

    /// The registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The flattened polygons.
    pub fn polygons(&self) -> &[Polygon<f64>] {
        &self.polygons
    }

    /// Whether the boundary has no polygons.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Extent of the boundary, used to fit the map view.
    pub fn bbox(&self) -> Option<BBox> {
        BBox::of_polygons(&self.polygons)
    }
}

/// Owner of all boundaries, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct BoundaryRegistry {
    boundaries: BTreeMap<String, Boundary>,
}

impl BoundaryRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            boundaries: BTreeMap::new(),
        }
    }

    /// Parse raw `GeoJSON` text and register the polygons under `name`.
    ///
    /// Accepts a feature collection, a single feature, or a bare polygon or
    /// multipolygon geometry.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::GeometryLoad`] if the text cannot be turned into
    /// polygons, or [`GeoError::DuplicateBoundary`] if `name` is taken.
    pub fn load(&mut self, name: &str, raw: &str) -> Result<&Boundary, GeoError> {
        let layer = Layer::parse(name, raw).map_err(|e| load_error(name, &e))?;
        self.load_layer(name, &layer)
    }

    /// Register the polygons of an already-parsed JSON value under `name`.
    ///
    /// # Errors
    ///
    /// Same as [`BoundaryRegistry::load`].
    pub fn load_value(&mut self, name: &str, raw: Value) -> Result<&Boundary, GeoError> {
        let layer = Layer::from_value(name, raw).map_err(|e| load_error(name, &e))?;
        self.load_layer(name, &layer)
    }

    /// Register the polygons of a parsed layer under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::GeometryLoad`] if the layer has no polygons, or
    /// [`GeoError::DuplicateBoundary`] if `name` is taken.
    pub fn load_layer(&mut self, name: &str, layer: &Layer) -> Result<&Boundary, GeoError> {
        match Boundary::from_layer(name, layer) {
            Ok(boundary) => self.register(boundary),
            Err(e) => {
                warn!(boundary = name, error = %e, "boundary not loaded");
                Err(e)
            }
        }
    }

    /// Register a prepared boundary.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::DuplicateBoundary`] if the name is already taken;
    /// registered boundaries are never replaced.
    pub fn register(&mut self, boundary: Boundary) -> Result<&Boundary, GeoError> {
        use std::collections::btree_map::Entry;

        match self.boundaries.entry(boundary.name.clone()) {
            Entry::Occupied(_) => Err(GeoError::DuplicateBoundary(boundary.name)),
            Entry::Vacant(slot) => {
                info!(
                    boundary = boundary.name(),
                    polygons = boundary.polygons().len(),
                    "boundary registered"
                );
                let stored: &Boundary = slot.insert(boundary);
                Ok(stored)
            }
        }
    }

    /// Look up a boundary by name.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::BoundaryNotFound`] if nothing is registered
    /// under `name`.
    pub fn get(&self, name: &str) -> Result<&Boundary, GeoError> {
        self.boundaries
            .get(name)
            .ok_or_else(|| GeoError::BoundaryNotFound(name.to_owned()))
    }

    /// Whether a boundary is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.boundaries.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.boundaries.keys().map(String::as_str)
    }

    /// Number of registered boundaries.
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// Whether no boundary is registered.
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }
}

fn load_error(name: &str, source: &GeoError) -> GeoError {
    warn!(boundary = name, error = %source, "boundary geometry unreadable");
    GeoError::GeometryLoad {
        name: name.to_owned(),
        reason: source.to_string(),
    }
}
