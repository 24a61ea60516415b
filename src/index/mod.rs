mod bbox;

use geo::{BoundingRect, MultiPolygon};
use rstar::{RTree, AABB};

use bbox::BoundingBox;
use crate::grid::{Cell, CellId};

/// R-tree over cell bounding boxes, built once per tiling.
///
/// Queries return a superset of the cells that truly intersect a polygon:
/// bounding-box hits that miss the geometry are left for the caller to
/// discard with an exact intersection, but no intersecting cell is ever missed.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    rtree: RTree<BoundingBox>,
    len: usize,
}

impl SpatialIndex {
    /// Bulk-load the index from cells; positions refer to the order of `cells`.
    /// Cells unwrapped across the antimeridian are entered once per footprint.
    pub fn build(cells: &[Cell]) -> Self {
        Self {
            rtree: RTree::bulk_load(
                cells.iter().enumerate()
                    .flat_map(|(i, cell)| {
                        cell.footprints()
                            .filter_map(|footprint| footprint.bounding_rect())
                            .map(move |rect| BoundingBox::new(i, cell.id(), rect))
                    })
                    .collect()
            ),
            len: cells.len(),
        }
    }

    /// Number of cells the index was built from.
    #[inline] pub fn len(&self) -> usize { self.len }

    #[inline] pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Positions of candidate cells whose bounding box meets any part of `polygon`.
    /// Sorted and free of duplicates.
    pub fn query(&self, polygon: &MultiPolygon<f64>) -> Vec<usize> {
        let mut hits: Vec<usize> = polygon.0.iter()
            .filter_map(|part| part.bounding_rect())
            .flat_map(|rect| {
                let envelope = AABB::from_corners(rect.min().into(), rect.max().into());
                self.rtree.locate_in_envelope_intersecting(&envelope).map(|bb| bb.idx())
            })
            .collect();
        hits.sort_unstable();
        hits.dedup();
        hits
    }

    /// Ids of candidate cells for `polygon`.
    pub fn candidates(&self, polygon: &MultiPolygon<f64>) -> Vec<CellId> {
        let mut ids: Vec<CellId> = polygon.0.iter()
            .filter_map(|part| part.bounding_rect())
            .flat_map(|rect| {
                let envelope = AABB::from_corners(rect.min().into(), rect.max().into());
                self.rtree.locate_in_envelope_intersecting(&envelope).map(|bb| bb.id())
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
