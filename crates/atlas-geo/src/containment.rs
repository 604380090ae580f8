//! Point-in-boundary containment.
//!
//! The [`ContainmentOracle`] trait hides the geometry library behind one
//! question: is this coordinate inside this boundary? [`GeoContainment`]
//! answers it with the `geo` crate's `Contains` predicate, which follows
//! DE-9IM: a point counts as contained only when it lies in a polygon's
//! interior. Points exactly on an outer edge, a vertex, or a hole's edge are
//! therefore not inside, which is the conservative answer the gate wants.

use atlas_types::Coordinate;
use geo::Contains;
use geo_types::Point;
use tracing::debug;

use crate::boundary::Boundary;

/// Answers whether a coordinate lies inside a boundary.
///
/// Implementations must be pure: the same inputs always yield the same
/// answer, and malformed input yields `false` rather than an error.
pub trait ContainmentOracle {
    /// Whether `point` lies strictly inside any polygon of `boundary`
    /// (inside its exterior and outside all of its holes).
    fn contains(&self, point: Coordinate, boundary: &Boundary) -> bool;
}

/// Containment backed by the `geo` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoContainment;

impl GeoContainment {
    /// Create the oracle.
    pub const fn new() -> Self {
        Self
    }
}

impl ContainmentOracle for GeoContainment {
    fn contains(&self, point: Coordinate, boundary: &Boundary) -> bool {
        contains(point, boundary)
    }
}

/// Whether `point` lies inside `boundary`, using [`GeoContainment`] rules.
///
/// Returns `false` for an empty boundary and for invalid coordinates.
pub fn contains(point: Coordinate, boundary: &Boundary) -> bool {
    if !point.is_valid() {
        debug!(
            boundary = boundary.name(),
            %point,
            "containment check on invalid coordinate"
        );
        return false;
    }
    let target = Point::new(point.longitude, point.latitude);
    boundary.polygons().iter().any(|polygon| polygon.contains(&target))
}
