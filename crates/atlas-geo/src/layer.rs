//! `GeoJSON` layers: parsing, feature classification, and property access.
//!
//! A layer is one named data resource ("Kota Sukabumi", "Minuman", "Rute",
//! ...). Its text may be a `FeatureCollection`, a single `Feature`, or a bare
//! geometry. Each feature is classified independently: a feature that cannot
//! be classified is skipped with a warning and counted, so one bad entry
//! never aborts the rest of the layer.

use atlas_types::{Category, Coordinate, GeometryKind, RouteKind};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::GeoError;
use crate::geometry::{PolygonShape, Shape, parse_position, parse_positions};

// ---------------------------------------------------------------------------
// Raw wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawFeature {
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
enum RawGeometry {
    Point(Vec<f64>),
    LineString(Vec<Vec<f64>>),
    Polygon(Vec<Vec<Vec<f64>>>),
    MultiPolygon(Vec<Vec<Vec<Vec<f64>>>>),
}

impl RawGeometry {
    fn classify(self) -> Result<FeatureGeometry, GeoError> {
        match self {
            Self::Point(p) => Ok(FeatureGeometry::Point(parse_position(&p)?)),
            Self::LineString(ps) => {
                let points = parse_positions(&ps)?;
                if points.len() < 2 {
                    return Err(GeoError::InvalidPosition {
                        reason: format!("line string has {} positions", points.len()),
                    });
                }
                Ok(FeatureGeometry::LineString(points))
            }
            Self::Polygon(rings) => Ok(FeatureGeometry::Area(Shape::Polygon(
                PolygonShape::parse(&rings)?,
            ))),
            Self::MultiPolygon(polys) => {
                let parts = polys
                    .iter()
                    .map(|p| PolygonShape::parse(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(FeatureGeometry::Area(Shape::multi(parts)?))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// The property bag of a feature.
///
/// Data files use Indonesian keys (`nama`, `jenis`, `deskripsi`, `gambar`);
/// English equivalents are accepted too. The first non-empty key wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag(Map<String, Value>);

impl PropertyBag {
    /// Wrap a raw JSON object.
    pub const fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// First non-empty string value among `keys`, trimmed.
    pub fn text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.0.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
    }

    /// Display name (`nama` or `name`).
    pub fn name(&self) -> Option<&str> {
        self.text(&["nama", "name"])
    }

    /// Free-form kind label (`jenis`, `category`, or `kategori`).
    pub fn kind(&self) -> Option<&str> {
        self.text(&["jenis", "category", "kategori"])
    }

    /// Role label used by some layers instead of a kind.
    pub fn role(&self) -> Option<&str> {
        self.text(&["role"])
    }

    /// Description (`deskripsi` or `description`).
    pub fn description(&self) -> Option<&str> {
        self.text(&["deskripsi", "description"])
    }

    /// Image reference (`gambar` or `image`).
    pub fn image(&self) -> Option<&str> {
        self.text(&["gambar", "image"])
    }

    /// External link (`link` or `url`).
    pub fn link(&self) -> Option<&str> {
        self.text(&["link", "url"])
    }

    /// Main product (`produk_utama` or `main_product`).
    pub fn main_product(&self) -> Option<&str> {
        self.text(&["produk_utama", "main_product"])
    }

    /// Published rating, as a number or numeric string, if it lies in
    /// `0..=5`.
    pub fn rating(&self) -> Option<f64> {
        let rating = match self.0.get("rating")? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        (0.0..=5.0).contains(&rating).then_some(rating)
    }

    /// Raw value access for keys without a dedicated accessor.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Guess a category from a feature's properties.
///
/// Returns `None` when nothing matches so a layer-level default can apply.
/// Rules run in priority order, first match wins:
///
/// 1. Specialty: role `makanan khas`, or a name containing mochi, bolu,
///    bika, sale, or roti.
/// 2. Beverage: role or kind `minuman`.
/// 3. Dessert: kind `dessert`, or a name containing puding, dessert,
///    dimsum, or roti.
/// 4. Culinary: kind or role `makanan`.
/// 5. School: kind `sekolah`, or a name containing `sd `, `smp `, `sma `,
///    or `sekolah`.
/// 6. Souvenir shop, facility, and attraction by kind.
pub fn classify_category(props: &PropertyBag) -> Option<Category> {
    let kind = props.kind().unwrap_or_default().to_lowercase();
    let role = props.role().unwrap_or_default().to_lowercase();
    let name = props.name().unwrap_or_default().to_lowercase();
    if role.contains("makanan khas") || contains_any(&name, &["mochi", "bolu", "bika", "sale", "roti"]) {
        return Some(Category::Specialty);
    }
    if role.contains("minuman") || kind.contains("minuman") {
        return Some(Category::Beverage);
    }
    if kind.contains("dessert") || contains_any(&name, &["puding", "dessert", "dimsum", "roti"]) {
        return Some(Category::Dessert);
    }
    if kind.contains("makanan") || role.contains("makanan") {
        return Some(Category::Culinary);
    }
    if kind.contains("sekolah") || contains_any(&name, &["sd ", "smp ", "sma ", "sekolah"]) {
        return Some(Category::School);
    }
    if contains_any(&kind, &["toko", "oleh"]) {
        return Some(Category::SouvenirShop);
    }
    if kind.contains("fasilitas") {
        return Some(Category::Facility);
    }
    if contains_any(&kind, &["wisata", "taman", "museum"]) {
        return Some(Category::Attraction);
    }
    None
}

// ---------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------

/// Classified geometry of a map feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    /// A marker.
    Point(Coordinate),
    /// A route polyline of at least two positions.
    LineString(Vec<Coordinate>),
    /// A polygon or multipolygon area.
    Area(Shape),
}

impl FeatureGeometry {
    /// The geometry type discriminator.
    pub const fn kind(&self) -> GeometryKind {
        match self {
            Self::Point(_) => GeometryKind::Point,
            Self::LineString(_) => GeometryKind::LineString,
            Self::Area(Shape::Polygon(_)) => GeometryKind::Polygon,
            Self::Area(Shape::MultiPolygon(_)) => GeometryKind::MultiPolygon,
        }
    }
}

/// One classified feature of a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFeature {
    /// The feature's geometry.
    pub geometry: FeatureGeometry,
    /// The feature's properties.
    pub properties: PropertyBag,
}

impl MapFeature {
    /// Display name, if the feature has one.
    pub fn name(&self) -> Option<&str> {
        self.properties.name()
    }

    /// Category from the properties, else `fallback`, else [`Category::Other`].
    pub fn category(&self, fallback: Option<Category>) -> Category {
        classify_category(&self.properties)
            .or(fallback)
            .unwrap_or(Category::Other)
    }

    /// Route kind for line features; `None` for everything else.
    pub fn route_kind(&self) -> Option<RouteKind> {
        if !matches!(self.geometry, FeatureGeometry::LineString(_)) {
            return None;
        }
        let name = self.name().unwrap_or_default().to_lowercase();
        Some(if name.contains("alternatif") {
            RouteKind::Alternative
        } else {
            RouteKind::Primary
        })
    }
}

fn classify_feature(index: usize, raw: Value) -> Result<MapFeature, GeoError> {
    let malformed = |reason: String| GeoError::MalformedFeature { index, reason };
    let feature: RawFeature = serde_json::from_value(raw).map_err(|e| malformed(e.to_string()))?;
    let geometry = feature
        .geometry
        .ok_or_else(|| malformed(String::from("missing geometry")))?
        .classify()
        .map_err(|e| malformed(e.to_string()))?;
    Ok(MapFeature {
        geometry,
        properties: PropertyBag::new(feature.properties.unwrap_or_default()),
    })
}

// ---------------------------------------------------------------------------
// Layer
// ---------------------------------------------------------------------------

/// Per-layer counts, logged after loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LayerSummary {
    /// Point features.
    pub points: usize,
    /// Line features.
    pub routes: usize,
    /// Polygon and multipolygon features.
    pub areas: usize,
    /// Features skipped as malformed.
    pub skipped: usize,
}

/// A named set of classified features.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    /// Human-readable label the layer is keyed by.
    pub label: String,
    /// Features that classified successfully, in document order.
    pub features: Vec<MapFeature>,
    /// Number of features skipped as malformed.
    pub skipped: usize,
}

impl Layer {
    /// Parse a layer from `GeoJSON` text.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Json`] if the text is not JSON, or
    /// [`GeoError::UnsupportedDocument`] if the top-level `type` is not
    /// recognized. Malformed individual features are skipped, not errors.
    pub fn parse(label: impl Into<String>, text: &str) -> Result<Self, GeoError> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_value(label, document)
    }

    /// Build a layer from an already-parsed `GeoJSON` value.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::UnsupportedDocument`] for unknown document types.
    pub fn from_value(label: impl Into<String>, document: Value) -> Result<Self, GeoError> {
        let label = label.into();
        let doc_type = document
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();

        let raw_features: Vec<Value> = match doc_type.as_str() {
            "FeatureCollection" => match document {
                Value::Object(mut map) => match map.remove("features") {
                    Some(Value::Array(features)) => features,
                    _ => Vec::new(),
                },
                _ => Vec::new(),
            },
            "Feature" => vec![document],
            "Point" | "LineString" | "Polygon" | "MultiPolygon" => {
                vec![serde_json::json!({ "type": "Feature", "geometry": document })]
            }
            other => return Err(GeoError::UnsupportedDocument(other.to_owned())),
        };

        let mut features = Vec::with_capacity(raw_features.len());
        let mut skipped: usize = 0;
        for (index, raw) in raw_features.into_iter().enumerate() {
            match classify_feature(index, raw) {
                Ok(feature) => features.push(feature),
                Err(e) => {
                    warn!(layer = %label, error = %e, "skipping malformed feature");
                    skipped = skipped.saturating_add(1);
                }
            }
        }

        Ok(Self {
            label,
            features,
            skipped,
        })
    }

    /// Iterate point features with their coordinates.
    pub fn points(&self) -> impl Iterator<Item = (&MapFeature, Coordinate)> {
        self.features.iter().filter_map(|f| match f.geometry {
            FeatureGeometry::Point(c) => Some((f, c)),
            _ => None,
        })
    }

    /// Iterate area features' shapes.
    pub fn areas(&self) -> impl Iterator<Item = &Shape> {
        self.features.iter().filter_map(|f| match &f.geometry {
            FeatureGeometry::Area(shape) => Some(shape),
            _ => None,
        })
    }

    /// Count features by geometry kind.
    pub fn summary(&self) -> LayerSummary {
        let mut summary = LayerSummary {
            skipped: self.skipped,
            ..LayerSummary::default()
        };
        for feature in &self.features {
            match feature.geometry {
                FeatureGeometry::Point(_) => summary.points = summary.points.saturating_add(1),
                FeatureGeometry::LineString(_) => {
                    summary.routes = summary.routes.saturating_add(1);
                }
                FeatureGeometry::Area(_) => summary.areas = summary.areas.saturating_add(1),
            }
        }
        summary
    }
}
