//! Geometry, `GeoJSON` layers, containment, and boundaries for the
//! Sukabumi souvenir atlas.
//!
//! This crate models the map's spatial data: validated rings and polygons,
//! classified `GeoJSON` layers, the containment oracle used by the
//! submission gate, and the registry of named boundaries.
//!
//! # Modules
//!
//! - [`boundary`] -- [`Boundary`] and the [`BoundaryRegistry`] that owns
//!   every named boundary.
//! - [`containment`] -- The [`ContainmentOracle`] trait and its `geo`-backed
//!   implementation.
//! - [`error`] -- Error types for parsing and lookup.
//! - [`geometry`] -- Rings, polygons, shapes, and bounding boxes.
//! - [`layer`] -- `GeoJSON` layer parsing, per-feature classification, and
//!   property access.

pub mod boundary;
pub mod containment;
pub mod error;
pub mod geometry;
pub mod layer;

// Re-export primary types at crate root.
pub use boundary::{Boundary, BoundaryRegistry};
pub use containment::{ContainmentOracle, GeoContainment, contains};
pub use error::GeoError;
pub use geometry::{BBox, PolygonShape, Ring, Shape};
pub use layer::{FeatureGeometry, Layer, LayerSummary, MapFeature, PropertyBag, classify_category};
