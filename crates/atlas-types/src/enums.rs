//! Enumeration types for the souvenir atlas.
//!
//! Categories drive the marker icon on the map, geometry kinds describe
//! what a loaded feature looks like, and the gate types describe the
//! outcome of a boundary-gated submission.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Point-of-interest categories
// ---------------------------------------------------------------------------

/// What kind of place a point of interest is.
///
/// The front-end picks a marker icon per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Category {
    /// Regional specialty foods sold as souvenirs (`makanan khas`).
    Specialty,
    /// Ready-to-eat culinary vendors (`kuliner siap saji`).
    Culinary,
    /// Desserts and light snacks.
    Dessert,
    /// Drink vendors (`minuman`).
    Beverage,
    /// Souvenir shops (`toko oleh-oleh`).
    SouvenirShop,
    /// Tourist attractions, parks, and museums (`wisata`).
    Attraction,
    /// Supporting facilities (`fasilitas pendukung`).
    Facility,
    /// Schools, shown so visitors can orient themselves.
    School,
    /// Anything that did not match a known category.
    Other,
}

impl Category {
    /// Stable lowercase label, identical to the serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Specialty => "specialty",
            Self::Culinary => "culinary",
            Self::Dessert => "dessert",
            Self::Beverage => "beverage",
            Self::SouvenirShop => "souvenir_shop",
            Self::Attraction => "attraction",
            Self::Facility => "facility",
            Self::School => "school",
            Self::Other => "other",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Geometry type discriminator of a loaded map feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum GeometryKind {
    /// A single position (shops, attractions).
    Point,
    /// A polyline (routes).
    LineString,
    /// A single polygon with optional holes (service areas, boundaries).
    Polygon,
    /// Several polygons treated as a union.
    MultiPolygon,
}

/// Whether a route is the main road or an alternative.
///
/// Alternative routes are drawn dashed and grey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RouteKind {
    /// The main suggested route.
    Primary,
    /// A route whose name marks it as `alternatif`.
    Alternative,
}

// ---------------------------------------------------------------------------
// Submission gate
// ---------------------------------------------------------------------------

/// Why the submission gate refused a candidate coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RejectionReason {
    /// The candidate lies outside (or exactly on the edge of) the boundary.
    OutsideBoundary,
    /// The boundary is not registered, so the candidate cannot be validated.
    BoundaryUnavailable,
    /// The candidate is not a valid latitude/longitude pair.
    InvalidCoordinate,
}

/// Outcome of one gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "outcome", content = "reason")]
#[ts(export, export_to = "bindings/")]
pub enum GateDecision {
    /// The candidate lies inside the boundary and may be submitted.
    Accepted,
    /// The candidate must not be submitted.
    Rejected(RejectionReason),
}

impl GateDecision {
    /// Whether the decision lets the submission proceed.
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// The rejection reason, if any.
    pub const fn rejection(self) -> Option<RejectionReason> {
        match self {
            Self::Accepted => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_serializes_as_snake_case() {
        let json = serde_json::to_string(&Category::SouvenirShop).unwrap_or_default();
        assert_eq!(json, "\"souvenir_shop\"");
        assert_eq!(Category::SouvenirShop.to_string(), "souvenir_shop");
    }

    #[test]
    fn gate_decision_helpers() {
        assert!(GateDecision::Accepted.is_accepted());
        assert_eq!(GateDecision::Accepted.rejection(), None);

        let rejected = GateDecision::Rejected(RejectionReason::BoundaryUnavailable);
        assert!(!rejected.is_accepted());
        assert_eq!(rejected.rejection(), Some(RejectionReason::BoundaryUnavailable));
    }

    #[test]
    fn gate_decision_wire_format() {
        let rejected = GateDecision::Rejected(RejectionReason::OutsideBoundary);
        let json = serde_json::to_value(rejected).unwrap_or_default();
        assert_eq!(json["outcome"], "Rejected");
        assert_eq!(json["reason"], "OutsideBoundary");
    }
}
