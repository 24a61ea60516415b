use std::{fmt, str::FromStr};

use geo::{Area, BoundingRect, Centroid, Coord, LineString, Point, Polygon, Translate};
use h3o::{CellIndex, Resolution};

use crate::error::Error;

/// Stable identifier of a hexagonal cell: the H3 index at the tiling resolution.
/// The same location and resolution always yield the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(CellIndex);

impl CellId {
    /// The underlying H3 index.
    #[inline] pub fn index(&self) -> CellIndex { self.0 }

    /// Tiling resolution this cell belongs to.
    #[inline] pub fn resolution(&self) -> u8 { u8::from(self.0.resolution()) }

    /// True for the twelve pentagonal cells of each resolution.
    #[inline] pub fn is_pentagon(&self) -> bool { self.0.is_pentagon() }
}

impl From<CellIndex> for CellId {
    fn from(index: CellIndex) -> Self { Self(index) }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl FromStr for CellId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellIndex::from_str(s)
            .map(Self)
            .map_err(|e| Error::invalid(format!("invalid cell id '{s}': {e}")))
    }
}

/// Check a tiling resolution and convert it to the H3 type.
/// Zero is rejected along with anything past the finest H3 level.
pub(crate) fn resolution(res: u8) -> Result<Resolution, Error> {
    if res == 0 {
        return Err(Error::invalid("resolution must be positive"))
    }
    Resolution::try_from(res)
        .map_err(|_| Error::invalid(format!("resolution {res} out of range [1, 15]")))
}

/// Planar footprint of an H3 cell in (lng, lat) degrees.
pub(crate) fn footprint(index: CellIndex) -> Polygon<f64> {
    let boundary = index.boundary();
    let mut coords: Vec<Coord<f64>> = boundary.iter()
        .map(|ll| Coord { x: ll.lng(), y: ll.lat() })
        .collect();

    // Unwrap cells straddling the antimeridian into [0, 360).
    let (min_x, max_x) = coords.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| (lo.min(c.x), hi.max(c.x)));
    if max_x - min_x > 180.0 {
        coords.iter_mut().filter(|c| c.x < 0.0).for_each(|c| c.x += 360.0);
    }

    Polygon::new(LineString::from(coords), vec![])
}

/// A tiling cell: id, hexagonal (occasionally pentagonal) boundary, and planar area.
/// Attribute amounts live in the owning `CellLayer`.
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    polygon: Polygon<f64>,
    wrapped: Option<Polygon<f64>>, // copy shifted by -360 when the boundary reaches past 180
    area: f64,
}

impl Cell {
    /// Cell with the footprint of its H3 index.
    pub fn from_id(id: CellId) -> Self {
        Self::new(id, footprint(id.index()))
    }

    /// Cell with an explicit boundary.
    pub fn new(id: CellId, polygon: Polygon<f64>) -> Self {
        let area = polygon.unsigned_area();
        let wrapped = polygon.bounding_rect()
            .filter(|rect| rect.max().x > 180.0)
            .map(|_| polygon.translate(-360.0, 0.0));
        Self { id, polygon, wrapped, area }
    }

    #[inline] pub fn id(&self) -> CellId { self.id }

    #[inline] pub fn polygon(&self) -> &Polygon<f64> { &self.polygon }

    /// The boundary, then for cells unwrapped across the antimeridian the same
    /// boundary in the western frame. Regions on either side of 180 degrees
    /// meet the cell in exactly one of them.
    pub fn footprints(&self) -> impl Iterator<Item = &Polygon<f64>> + '_ {
        std::iter::once(&self.polygon).chain(self.wrapped.as_ref())
    }

    /// Planar area in square degrees.
    #[inline] pub fn area(&self) -> f64 { self.area }

    pub fn centroid(&self) -> Option<Point<f64>> { self.polygon.centroid() }
}
