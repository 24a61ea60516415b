use geo::Rect;
use rstar::{RTreeObject, AABB};

use crate::grid::CellId;

/// A cell's bounding box in an R-tree, tagged with the cell's layer position.
#[derive(Debug, Clone)]
pub(super) struct BoundingBox {
    idx: usize, // Position of the cell in its layer
    id: CellId,
    bbox: Rect<f64>,
}

impl BoundingBox {
    pub(super) fn new(idx: usize, id: CellId, bbox: Rect<f64>) -> Self {
        Self { idx, id, bbox }
    }

    /// Get the layer position of the corresponding cell.
    #[inline] pub(super) fn idx(&self) -> usize { self.idx }

    /// Get the id of the corresponding cell.
    #[inline] pub(super) fn id(&self) -> CellId { self.id }
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}
