//! Core entity structs for the souvenir atlas.
//!
//! Covers [`Coordinate`], [`PointOfInterest`], visitor [`Review`]s, and the
//! transient [`SubmissionAttempt`] produced by each gate evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Category, GateDecision};
use crate::ids::PoiId;

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// A WGS84 position in degrees.
///
/// Valid coordinates have `latitude` in `[-90, 90]` and `longitude` in
/// `[-180, 180]`. Construction does not enforce the range; callers that
/// accept external input check [`Coordinate::is_valid`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coordinate {
    /// Degrees north of the equator.
    pub latitude: f64,
    /// Degrees east of the prime meridian.
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a coordinate from a `GeoJSON` position, which is ordered
    /// `[longitude, latitude]`.
    pub const fn from_lon_lat(longitude: f64, latitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and within WGS84 range.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

// ---------------------------------------------------------------------------
// PointOfInterest
// ---------------------------------------------------------------------------

/// A named place shown as a marker on the map.
///
/// Records are append-only once they enter the feature store. The name is
/// the unique key under case-insensitive comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PointOfInterest {
    /// Stable identifier.
    pub id: PoiId,
    /// Display name, also the lookup key (case-insensitive).
    pub name: String,
    /// What kind of place this is.
    pub category: Category,
    /// Free-text description shown in the popup.
    pub description: String,
    /// Optional image URI or relative path.
    pub image: Option<String>,
    /// Optional external link (shop website, social page).
    pub link: Option<String>,
    /// Best-known product (`produk_utama` in the data files).
    pub main_product: Option<String>,
    /// Published rating from the data files, 0 to 5.
    pub rating: Option<f64>,
    /// Where the place is.
    pub location: Coordinate,
    /// Label of the data layer the record came from, or `None` for
    /// user submissions.
    pub source_layer: Option<String>,
    /// When the record entered the atlas.
    pub created_at: DateTime<Utc>,
}

impl PointOfInterest {
    /// Create a record with a fresh id and the current timestamp.
    pub fn new(
        name: impl Into<String>,
        category: Category,
        description: impl Into<String>,
        location: Coordinate,
    ) -> Self {
        Self {
            id: PoiId::new(),
            name: name.into(),
            category,
            description: description.into(),
            image: None,
            link: None,
            main_product: None,
            rating: None,
            location,
            source_layer: None,
            created_at: Utc::now(),
        }
    }

    /// Attach an image reference.
    #[must_use]
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    /// Attach an external link.
    #[must_use]
    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.link = link;
        self
    }

    /// Attach the main product.
    #[must_use]
    pub fn with_main_product(mut self, main_product: Option<String>) -> Self {
        self.main_product = main_product;
        self
    }

    /// Attach a published rating.
    #[must_use]
    pub const fn with_rating(mut self, rating: Option<f64>) -> Self {
        self.rating = rating;
        self
    }

    /// Record the data layer this point was loaded from.
    #[must_use]
    pub fn in_layer(mut self, label: impl Into<String>) -> Self {
        self.source_layer = Some(label.into());
        self
    }

    /// The case-folded name used as the store key.
    pub fn key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

// ---------------------------------------------------------------------------
// SubmissionAttempt
// ---------------------------------------------------------------------------

/// One gate evaluation: the clicked coordinate and what the gate decided.
///
/// Never persisted; it lives for the duration of a single click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SubmissionAttempt {
    /// The coordinate the user clicked.
    pub candidate: Coordinate,
    /// The gate's verdict.
    pub outcome: GateDecision,
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// A visitor's rating and comment for a stored place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Review {
    /// Name of the reviewed place, as stored.
    pub place: String,
    /// Stars, 1 to 5.
    pub rating: u8,
    /// What the visitor wrote.
    pub comment: String,
    /// When the review was written.
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Create a review stamped with the current time.
    pub fn new(place: impl Into<String>, rating: u8, comment: impl Into<String>) -> Self {
        Self {
            place: place.into(),
            rating,
            comment: comment.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_range_checks() {
        assert!(Coordinate::new(-6.92, 106.93).is_valid());
        assert!(Coordinate::new(90.0, -180.0).is_valid());
        assert!(!Coordinate::new(90.5, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 181.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn lon_lat_order_is_swapped() {
        let c = Coordinate::from_lon_lat(106.93, -6.92);
        assert_eq!(c, Coordinate::new(-6.92, 106.93));
    }

    #[test]
    fn poi_key_is_case_folded_and_trimmed() {
        let poi = PointOfInterest::new(
            "  Mochi Kaswari Lampion ",
            Category::Specialty,
            "",
            Coordinate::new(-6.92, 106.93),
        );
        assert_eq!(poi.key(), "mochi kaswari lampion");
    }

    #[test]
    fn builder_helpers_fill_optional_fields() {
        let poi = PointOfInterest::new("Sunda Rasa", Category::Culinary, "", Coordinate::new(0.0, 0.0))
            .with_image(Some(String::from("images/sundarasa.jpg")))
            .with_link(None)
            .with_main_product(Some(String::from("Nasi timbel")))
            .with_rating(Some(4.5))
            .in_layer("Kuliner Siap Saji");
        assert_eq!(poi.image.as_deref(), Some("images/sundarasa.jpg"));
        assert!(poi.link.is_none());
        assert_eq!(poi.source_layer.as_deref(), Some("Kuliner Siap Saji"));
        assert_eq!(poi.main_product.as_deref(), Some("Nasi timbel"));
        assert_eq!(poi.rating, Some(4.5));
    }

    #[test]
    fn review_serializes_with_place_and_stars() {
        let review = Review::new("Sunda Rasa", 5, "Enak");
        let json = serde_json::to_value(&review).unwrap_or_default();
        assert_eq!(json.get("rating").and_then(serde_json::Value::as_u64), Some(5));
        assert_eq!(json.get("place").and_then(serde_json::Value::as_str), Some("Sunda Rasa"));
    }
}
