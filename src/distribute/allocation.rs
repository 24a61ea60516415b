use geo::{Area, BooleanOps, MultiPolygon};

use crate::grid::Cell;
use crate::index::SpatialIndex;

/// How one region's mass is split across cells.
/// Weights are positive and sum to one.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionAllocation {
    /// (cell position, weight), ordered by cell position.
    pub shares: Vec<(usize, f64)>,
    /// Area of the region itself.
    pub region_area: f64,
    /// Sum of the positive intersection areas.
    pub covered_area: f64,
}

impl RegionAllocation {
    /// Fraction of the region's area that falls on the tiling.
    #[inline]
    pub fn coverage(&self) -> f64 {
        if self.region_area > 0.0 { self.covered_area / self.region_area } else { 0.0 }
    }

    /// Sum of the weights, one up to rounding.
    #[inline]
    pub fn weight_sum(&self) -> f64 {
        self.shares.iter().map(|&(_, w)| w).sum()
    }
}

/// Split `region` across the candidate cells by exact overlap area.
///
/// Intersections of `area_epsilon * region_area` or less (boundary contact,
/// rounding slivers) are dropped. Returns `None` when nothing is left: the
/// region lies outside the tiling.
pub fn allocate(
    region: &MultiPolygon<f64>,
    cells: &[Cell],
    index: &SpatialIndex,
    area_epsilon: f64,
) -> Option<RegionAllocation> {
    let region_area = region.unsigned_area();
    let threshold = area_epsilon * region_area;

    let areas: Vec<(usize, f64)> = index.query(region).into_iter()
        .filter_map(|i| {
            let area: f64 = cells[i].footprints()
                .map(|footprint| region.intersection(footprint).unsigned_area())
                .sum();
            (area > threshold && area > 0.0).then_some((i, area))
        })
        .collect();

    let covered_area: f64 = areas.iter().map(|&(_, a)| a).sum();
    if areas.is_empty() || !(covered_area > 0.0) { return None }

    Some(RegionAllocation {
        shares: areas.into_iter().map(|(i, a)| (i, a / covered_area)).collect(),
        region_area,
        covered_area,
    })
}
