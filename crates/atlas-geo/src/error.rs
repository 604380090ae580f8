//! Error types for the `atlas-geo` crate.
//!
//! All fallible operations in this crate return [`GeoError`] through the
//! standard [`Result`] type.

/// Errors that can occur while parsing geometry or resolving boundaries.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// The layer text is not a JSON document of a recognized `GeoJSON` shape.
    #[error("invalid GeoJSON document: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The document is JSON but not a feature collection, feature, or
    /// supported bare geometry.
    #[error("unsupported GeoJSON document type: {0}")]
    UnsupportedDocument(String),

    /// A single feature could not be classified into a supported geometry.
    #[error("malformed feature #{index}: {reason}")]
    MalformedFeature {
        /// Position of the feature within its collection.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A position is not `[longitude, latitude, ...]` within WGS84 range.
    #[error("invalid position: {reason}")]
    InvalidPosition {
        /// What was wrong with it.
        reason: String,
    },

    /// A linear ring has fewer than four positions.
    #[error("ring has {points} positions, at least 4 are required")]
    RingTooShort {
        /// Number of positions found.
        points: usize,
    },

    /// A linear ring does not end where it starts.
    #[error("ring is not closed")]
    RingNotClosed,

    /// A multipolygon has no member polygons.
    #[error("multipolygon has no polygons")]
    EmptyMultiPolygon,

    /// Raw input could not be turned into boundary polygons.
    #[error("cannot load boundary {name}: {reason}")]
    GeometryLoad {
        /// Name the boundary was to be registered under.
        name: String,
        /// Why loading failed.
        reason: String,
    },

    /// A boundary name was requested that has not been registered.
    #[error("boundary not found: {0}")]
    BoundaryNotFound(String),

    /// A boundary was registered twice under the same name.
    #[error("duplicate boundary: {0}")]
    DuplicateBoundary(String),
}
