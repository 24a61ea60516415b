use std::collections::VecDeque;

use ahash::AHashSet;
use geo::{BoundingRect, InteriorPoint, Intersects, Polygon, Relate};
use h3o::{CellIndex, LatLng, Resolution};
use rayon::prelude::*;

use crate::error::{Error, SkippedRegion};
use crate::grid::{cell, Cell, CellId};
use crate::region::SourceRegion;

/// Result of tiling a set of regions.
#[derive(Debug, Clone, Default)]
pub struct Coverage {
    /// Every cell sharing interior area with at least one region.
    pub cells: AHashSet<CellId>,
    /// Regions whose geometry could not be tiled.
    pub skipped: Vec<SkippedRegion>,
}

/// Enumerate the cells at `resolution` that cover the given regions.
/// Multi-part regions are tiled part by part and the results unioned.
/// Regions with unusable geometry are skipped and listed in `Coverage::skipped`.
pub fn generate_coverage(regions: &[SourceRegion], resolution: u8) -> Result<Coverage, Error> {
    cover_regions(regions, resolution, true)
}

/// `generate_coverage`, with regions tiled on the rayon pool only when `parallel` is set.
pub(crate) fn cover_regions(regions: &[SourceRegion], resolution: u8, parallel: bool) -> Result<Coverage, Error> {
    let resolution = cell::resolution(resolution)?;
    if regions.is_empty() {
        return Err(Error::invalid("region set is empty"))
    }

    let tile = |region: &SourceRegion| -> Result<AHashSet<CellIndex>, SkippedRegion> {
        let mp = region.polygons()
            .map_err(|reason| SkippedRegion { id: region.id.clone(), reason })?;
        let mut cells = AHashSet::new();
        for part in mp.0.iter() {
            cover_polygon(part, resolution, &mut cells);
        }
        Ok(cells)
    };
    let per_region: Vec<Result<AHashSet<CellIndex>, SkippedRegion>> = if parallel {
        regions.par_iter().map(tile).collect()
    } else {
        regions.iter().map(tile).collect()
    };

    let mut coverage = Coverage::default();
    for result in per_region {
        match result {
            Ok(cells) => coverage.cells.extend(cells.into_iter().map(CellId::from)),
            Err(skipped) => coverage.skipped.push(skipped),
        }
    }

    Ok(coverage)
}

/// True when the polygons share interior area; boundary contact alone does not count.
fn overlaps(a: &Polygon<f64>, b: &Polygon<f64>) -> bool {
    let im = a.relate(b);
    im.is_intersects() && !im.is_touches()
}

/// Flood-fill the cells overlapping `polygon`, starting around its interior point.
fn cover_polygon(polygon: &Polygon<f64>, resolution: Resolution, out: &mut AHashSet<CellIndex>) {
    let (Some(point), Some(rect)) = (polygon.interior_point(), polygon.bounding_rect()) else { return };
    let Ok(seed) = LatLng::new(point.y(), point.x()) else { return };

    // The planar footprint of the seed cell can miss the point by a hair,
    // so the whole first ring is queued.
    let mut visited: AHashSet<CellIndex> = AHashSet::new();
    let mut queue: VecDeque<CellIndex> = VecDeque::new();
    for index in seed.to_cell(resolution).grid_disk::<Vec<_>>(1) {
        if visited.insert(index) { queue.push_back(index) }
    }

    while let Some(index) = queue.pop_front() {
        let cell = Cell::from_id(CellId::from(index));
        let hit = cell.footprints().any(|footprint| {
            footprint.bounding_rect().is_some_and(|bbox| bbox.intersects(&rect))
                && overlaps(polygon, footprint)
        });
        if !hit { continue }

        out.insert(index);
        for next in index.grid_disk::<Vec<_>>(1) {
            if visited.insert(next) { queue.push_back(next) }
        }
    }
}
