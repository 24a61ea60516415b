use std::{fmt, sync::Arc};

use ahash::AHashMap;
use geo::{Area, CoordsIter, Geometry, MultiPolygon, Polygon};

use crate::error::GeometryError;

/// Stable key for a source region (e.g. a census tract GEOID).
/// Keeps the original text, leading zeros included.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(Arc<str>);

impl RegionId {
    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self { Self(Arc::from(id)) }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self { Self(Arc::from(id)) }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// A source polygon carrying population counts by attribute name.
#[derive(Debug, Clone)]
pub struct SourceRegion {
    pub id: RegionId,
    pub geometry: Geometry<f64>,
    attributes: AHashMap<String, f64>,
}

impl SourceRegion {
    pub fn new(id: impl Into<RegionId>, geometry: impl Into<Geometry<f64>>) -> Self {
        Self { id: id.into(), geometry: geometry.into(), attributes: AHashMap::new() }
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: f64) {
        self.attributes.insert(name.into(), value);
    }

    /// Value of an attribute; absent attributes count as zero.
    #[inline]
    pub fn value(&self, name: &str) -> f64 {
        self.attributes.get(name).copied().unwrap_or(0.0)
    }

    /// Raw attribute lookup, `None` when absent.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).copied()
    }

    /// Iterate over the attributes that are present.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.attributes.iter().map(|(name, &value)| (name.as_str(), value))
    }

    /// The region's geometry as validated polygon parts.
    pub fn polygons(&self) -> Result<MultiPolygon<f64>, GeometryError> {
        let mp = polygonal(&self.geometry)?;
        validate(&mp)?;
        Ok(mp)
    }
}

/// Name of a geometry kind, for diagnostics.
fn kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Flatten an areal geometry into its polygon parts.
/// Collections are accepted only when every member is areal.
fn polygonal(geometry: &Geometry<f64>) -> Result<MultiPolygon<f64>, GeometryError> {
    match geometry {
        Geometry::Polygon(polygon) => Ok(MultiPolygon(vec![polygon.clone()])),
        Geometry::MultiPolygon(mp) => Ok(mp.clone()),
        Geometry::Rect(rect) => Ok(MultiPolygon(vec![rect.to_polygon()])),
        Geometry::Triangle(triangle) => Ok(MultiPolygon(vec![triangle.to_polygon()])),
        Geometry::GeometryCollection(collection) => {
            let mut parts: Vec<Polygon<f64>> = Vec::new();
            for member in collection.0.iter() {
                parts.extend(polygonal(member)?.0);
            }
            Ok(MultiPolygon(parts))
        }
        other => Err(GeometryError::Unsupported(kind(other))),
    }
}

fn validate(mp: &MultiPolygon<f64>) -> Result<(), GeometryError> {
    if mp.0.is_empty() { return Err(GeometryError::Empty) }

    for (part, polygon) in mp.0.iter().enumerate() {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for (ring, ls) in rings.enumerate() {
            let len = ls.0.len();
            if len < 4 { return Err(GeometryError::TooFewPoints { part, ring, len }) }
        }
        if polygon.coords_iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
            return Err(GeometryError::NonFinite { part })
        }
    }

    // NaN-safe: anything but a strictly positive area is rejected.
    if !(mp.unsigned_area() > 0.0) { return Err(GeometryError::ZeroArea) }

    Ok(())
}
