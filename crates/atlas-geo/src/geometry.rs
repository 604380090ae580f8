//! Validated polygon geometry and its conversion to `geo-types`.
//!
//! `GeoJSON` positions arrive as `[longitude, latitude, ...]` arrays. This
//! module turns them into [`Coordinate`]s, closed [`Ring`]s, and
//! [`PolygonShape`]s, then hands the geometry library the equivalent
//! [`geo_types::Polygon`] with `x = longitude` and `y = latitude`.
//!
//! Self-intersection is not checked.

use atlas_types::Coordinate;
use geo::BoundingRect;
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// Minimum number of positions in a closed ring (a triangle plus closure).
pub const MIN_RING_POSITIONS: usize = 4;

/// Parse a `GeoJSON` position (`[lon, lat]` or `[lon, lat, alt]`).
///
/// # Errors
///
/// Returns [`GeoError::InvalidPosition`] if fewer than two components are
/// present or the pair is outside WGS84 range.
pub fn parse_position(raw: &[f64]) -> Result<Coordinate, GeoError> {
    let (Some(&lon), Some(&lat)) = (raw.first(), raw.get(1)) else {
        return Err(GeoError::InvalidPosition {
            reason: format!("expected [lon, lat], got {} components", raw.len()),
        });
    };
    let coordinate = Coordinate::from_lon_lat(lon, lat);
    if !coordinate.is_valid() {
        return Err(GeoError::InvalidPosition {
            reason: format!("{coordinate} is outside WGS84 range"),
        });
    }
    Ok(coordinate)
}

/// Parse a sequence of positions.
///
/// # Errors
///
/// Returns the first [`GeoError::InvalidPosition`] encountered.
pub fn parse_positions(raw: &[Vec<f64>]) -> Result<Vec<Coordinate>, GeoError> {
    raw.iter().map(|p| parse_position(p)).collect()
}

const fn to_coord(c: Coordinate) -> Coord<f64> {
    Coord {
        x: c.longitude,
        y: c.latitude,
    }
}

// ---------------------------------------------------------------------------
// Ring
// ---------------------------------------------------------------------------

/// A closed linear ring of at least four positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ring(Vec<Coordinate>);

impl Ring {
    /// Build a ring, checking length and closure.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::RingTooShort`] or [`GeoError::RingNotClosed`].
    pub fn new(points: Vec<Coordinate>) -> Result<Self, GeoError> {
        if points.len() < MIN_RING_POSITIONS {
            return Err(GeoError::RingTooShort {
                points: points.len(),
            });
        }
        if points.first() != points.last() {
            return Err(GeoError::RingNotClosed);
        }
        Ok(Self(points))
    }

    /// Parse a ring from raw `GeoJSON` positions.
    ///
    /// # Errors
    ///
    /// Propagates position and ring validation errors.
    pub fn parse(raw: &[Vec<f64>]) -> Result<Self, GeoError> {
        Self::new(parse_positions(raw)?)
    }

    /// The ring's positions, closure included.
    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    /// Convert to a `geo-types` line string.
    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(self.0.iter().copied().map(to_coord).collect())
    }
}

// ---------------------------------------------------------------------------
// Polygon
// ---------------------------------------------------------------------------

/// One outer ring plus zero or more holes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonShape {
    /// The outer boundary.
    pub exterior: Ring,
    /// Rings cut out of the interior.
    pub holes: Vec<Ring>,
}

impl PolygonShape {
    /// Parse `GeoJSON` polygon coordinates: the first ring is the exterior,
    /// the rest are holes.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::RingTooShort`] when no rings are present, or any
    /// ring validation error.
    pub fn parse(raw: &[Vec<Vec<f64>>]) -> Result<Self, GeoError> {
        let Some((exterior, holes)) = raw.split_first() else {
            return Err(GeoError::RingTooShort { points: 0 });
        };
        Ok(Self {
            exterior: Ring::parse(exterior)?,
            holes: holes.iter().map(|h| Ring::parse(h)).collect::<Result<_, _>>()?,
        })
    }

    /// Convert to a `geo-types` polygon.
    pub fn to_polygon(&self) -> Polygon<f64> {
        Polygon::new(
            self.exterior.to_line_string(),
            self.holes.iter().map(Ring::to_line_string).collect(),
        )
    }
}

/// An areal geometry: a single polygon or a non-empty multipolygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Shape {
    /// A single polygon.
    Polygon(PolygonShape),
    /// A union of polygons.
    MultiPolygon(Vec<PolygonShape>),
}

impl Shape {
    /// Build a multipolygon, rejecting an empty part list.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::EmptyMultiPolygon`] if `parts` is empty.
    pub fn multi(parts: Vec<PolygonShape>) -> Result<Self, GeoError> {
        if parts.is_empty() {
            return Err(GeoError::EmptyMultiPolygon);
        }
        Ok(Self::MultiPolygon(parts))
    }

    /// Iterate the constituent polygons, flattening multipolygons.
    pub fn parts(&self) -> impl Iterator<Item = &PolygonShape> {
        let slice: &[PolygonShape] = match self {
            Self::Polygon(p) => core::slice::from_ref(p),
            Self::MultiPolygon(ps) => ps,
        };
        slice.iter()
    }
}

// ---------------------------------------------------------------------------
// Bounding box
// ---------------------------------------------------------------------------

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lng: f64,
    /// Eastern edge.
    pub max_lng: f64,
}

impl BBox {
    /// Bounding box of a set of polygons, or `None` if the set is empty.
    pub fn of_polygons(polygons: &[Polygon<f64>]) -> Option<Self> {
        let rect = MultiPolygon::new(polygons.to_vec()).bounding_rect()?;
        Some(Self {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lng: rect.min().x,
            max_lng: rect.max().x,
        })
    }

    /// Check if this bbox contains a coordinate (edges inclusive).
    pub fn contains(&self, c: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&c.latitude)
            && (self.min_lng..=self.max_lng).contains(&c.longitude)
    }

    /// South-west and north-east corners, the form a map's "fit bounds"
    /// call expects.
    pub const fn corners(&self) -> (Coordinate, Coordinate) {
        (
            Coordinate::new(self.min_lat, self.min_lng),
            Coordinate::new(self.max_lat, self.max_lng),
        )
    }
}
