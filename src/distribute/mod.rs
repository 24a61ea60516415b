mod allocation;
mod report;

use ndarray::Array1;
use rayon::prelude::*;

use crate::error::{Error, GeometryError, SkippedRegion};
use crate::grid::CellLayer;
use crate::index::SpatialIndex;
use crate::region::SourceRegion;

pub use allocation::{allocate, RegionAllocation};
pub use report::DistributionReport;

/// Covered-area fractions below `1 - COVERAGE_TOLERANCE` are reported as partial.
const COVERAGE_TOLERANCE: f64 = 1e-9;

/// Tuning for one distribution pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributeOptions {
    /// Intersections at or below this fraction of the region's area count as zero.
    pub area_epsilon: f64,
    /// Compute per-region allocations on the rayon thread pool.
    pub parallel: bool,
    pub verbose: u8,
}

impl Default for DistributeOptions {
    fn default() -> Self {
        Self { area_epsilon: 1e-12, parallel: true, verbose: 0 }
    }
}

enum Outcome {
    Allocated(RegionAllocation),
    Gap,
    Skipped(GeometryError),
}

/// Redistribute every region's attribute counts onto the cells of `layer`,
/// weighted by overlap area, adding into the existing accumulators.
///
/// Allocations are computed per region into private buffers (in parallel when
/// enabled), then merged once in region order, so the result does not depend
/// on thread scheduling. Running twice without `CellLayer::reset` doubles
/// every amount.
pub fn distribute(
    regions: &[SourceRegion],
    layer: &mut CellLayer,
    index: &SpatialIndex,
    options: &DistributeOptions,
) -> Result<DistributionReport, Error> {
    validate(regions, layer, index, options)?;

    let attributes = layer.attributes().to_vec();
    let values: Vec<Array1<f64>> = regions.iter()
        .map(|region| attributes.iter().map(|name| region.value(name)).collect())
        .collect();

    let outcomes: Vec<Outcome> = {
        let cells = layer.cells();
        let outcome = |region: &SourceRegion| match region.polygons() {
            Err(reason) => Outcome::Skipped(reason),
            Ok(mp) => match allocate(&mp, cells, index, options.area_epsilon) {
                Some(allocation) => Outcome::Allocated(allocation),
                None => Outcome::Gap,
            },
        };
        if options.parallel {
            regions.par_iter().map(outcome).collect()
        } else {
            regions.iter().map(outcome).collect()
        }
    };

    let mut input_totals = Array1::<f64>::zeros(attributes.len());
    let mut distributed_totals = Array1::<f64>::zeros(attributes.len());
    let mut report = DistributionReport { attributes, ..Default::default() };

    for ((region, values), outcome) in regions.iter().zip(values.iter()).zip(outcomes) {
        input_totals += values;
        match outcome {
            Outcome::Skipped(reason) => {
                if options.verbose > 1 { eprintln!("[distribute] skipping region {}: {}", region.id, reason); }
                report.skipped.push(SkippedRegion { id: region.id.clone(), reason });
            }
            Outcome::Gap => {
                if options.verbose > 1 { eprintln!("[distribute] region {} lies outside the tiling", region.id); }
                report.coverage_gaps.push(region.id.clone());
            }
            Outcome::Allocated(allocation) => {
                for &(cell, weight) in allocation.shares.iter() {
                    layer.accumulate(cell, weight, values);
                }
                distributed_totals.scaled_add(allocation.weight_sum(), values);

                let coverage = allocation.coverage();
                if coverage < 1.0 - COVERAGE_TOLERANCE {
                    report.partial_coverage.push((region.id.clone(), coverage));
                }
                report.distributed += 1;
            }
        }
    }

    report.input_totals = input_totals.to_vec();
    report.distributed_totals = distributed_totals.to_vec();

    if options.verbose > 0 { eprintln!("[distribute] {report}"); }

    Ok(report)
}

/// Argument checks; nothing is touched when these fail.
fn validate(
    regions: &[SourceRegion],
    layer: &CellLayer,
    index: &SpatialIndex,
    options: &DistributeOptions,
) -> Result<(), Error> {
    if regions.is_empty() {
        return Err(Error::invalid("region set is empty"))
    }
    if index.len() != layer.len() {
        return Err(Error::invalid(format!(
            "spatial index covers {} cells but the layer has {}", index.len(), layer.len()
        )))
    }
    if !(options.area_epsilon >= 0.0 && options.area_epsilon.is_finite()) {
        return Err(Error::invalid(format!("area epsilon {} must be finite and non-negative", options.area_epsilon)))
    }
    check_counts(regions, layer.attributes())
}

/// Every present count of the named attributes must be finite and non-negative.
pub(crate) fn check_counts(regions: &[SourceRegion], attributes: &[String]) -> Result<(), Error> {
    for region in regions {
        for name in attributes {
            match region.attribute(name) {
                Some(value) if !(value >= 0.0 && value.is_finite()) => {
                    return Err(Error::invalid(format!(
                        "region {}: attribute '{name}' has invalid count {value}", region.id
                    )))
                }
                _ => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon, Point, Polygon};
    use h3o::CellIndex;

    use crate::grid::{Cell, CellId};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]
    }

    fn ids() -> Vec<CellId> {
        CellIndex::base_cells().map(CellId::from).collect()
    }

    /// Cell X = [0,1]x[0,1], cell Y = [1,2]x[0,1].
    fn layer_xy() -> (CellLayer, SpatialIndex) {
        let ids = ids();
        let cells = vec![Cell::new(ids[0], rect(0.0, 0.0, 1.0, 1.0)), Cell::new(ids[1], rect(1.0, 0.0, 2.0, 1.0))];
        let index = SpatialIndex::build(&cells);
        (CellLayer::new(cells, &["pop".to_string()]).unwrap(), index)
    }

    fn sequential() -> DistributeOptions {
        DistributeOptions { parallel: false, ..Default::default() }
    }

    #[test]
    fn two_region_scenario() {
        let (mut layer, index) = layer_xy();
        let regions = vec![
            SourceRegion::new("A", rect(0.2, 0.2, 0.4, 0.4)).with_attribute("pop", 100.0),
            SourceRegion::new("B", rect(0.4, 0.0, 1.4, 1.0)).with_attribute("pop", 200.0),
        ];

        let report = distribute(&regions, &mut layer, &index, &sequential()).unwrap();

        let ids = ids();
        assert!((layer.amount(ids[0], "pop").unwrap() - 220.0).abs() < 1e-9);
        assert!((layer.amount(ids[1], "pop").unwrap() - 80.0).abs() < 1e-9);
        assert_eq!(report.distributed, 2);
        assert!(report.is_conservative(1e-9));
    }

    #[test]
    fn boundary_coincident_region_is_not_double_counted() {
        let (mut layer, index) = layer_xy();
        let regions = vec![SourceRegion::new("X", rect(0.0, 0.0, 1.0, 1.0)).with_attribute("pop", 50.0)];
        distribute(&regions, &mut layer, &index, &sequential()).unwrap();

        let ids = ids();
        assert_eq!(layer.amount(ids[0], "pop"), Some(50.0));
        assert_eq!(layer.amount(ids[1], "pop"), Some(0.0));
    }

    #[test]
    fn absent_attributes_count_as_zero() {
        let ids = ids();
        let cells = vec![Cell::new(ids[0], rect(0.0, 0.0, 1.0, 1.0))];
        let index = SpatialIndex::build(&cells);
        let mut layer = CellLayer::new(cells, &["male".to_string(), "female".to_string()]).unwrap();

        let regions = vec![SourceRegion::new("A", rect(0.1, 0.1, 0.9, 0.9)).with_attribute("male", 7.0)];
        distribute(&regions, &mut layer, &index, &sequential()).unwrap();

        assert_eq!(layer.amount(ids[0], "male"), Some(7.0));
        assert_eq!(layer.amount(ids[0], "female"), Some(0.0));
    }

    #[test]
    fn gaps_and_bad_geometry_are_reported_not_fatal() {
        let (mut layer, index) = layer_xy();
        let regions = vec![
            SourceRegion::new("in", rect(0.1, 0.1, 0.9, 0.9)).with_attribute("pop", 10.0),
            SourceRegion::new("out", rect(5.0, 5.0, 6.0, 6.0)).with_attribute("pop", 20.0),
            SourceRegion::new("point", Point::new(0.5, 0.5)).with_attribute("pop", 30.0),
            SourceRegion::new("empty", MultiPolygon::<f64>(vec![])).with_attribute("pop", 40.0),
        ];

        let report = distribute(&regions, &mut layer, &index, &sequential()).unwrap();

        assert_eq!(report.distributed, 1);
        assert_eq!(report.coverage_gaps.iter().map(|id| id.as_str()).collect::<Vec<_>>(), vec!["out"]);
        assert_eq!(report.skipped_count(), 2);
        assert_eq!(report.skipped[0].reason, GeometryError::Unsupported("Point"));
        assert_eq!(report.skipped[1].reason, GeometryError::Empty);
        assert_eq!(report.input_totals, vec![100.0]);
        assert_eq!(report.distributed_totals, vec![10.0]);
        assert_eq!(report.undistributed("pop"), Some(90.0));
    }

    #[test]
    fn partial_coverage_is_tracked() {
        let (mut layer, index) = layer_xy();
        let regions = vec![SourceRegion::new("edge", rect(1.5, 0.0, 2.5, 1.0)).with_attribute("pop", 10.0)];
        let report = distribute(&regions, &mut layer, &index, &sequential()).unwrap();

        assert_eq!(report.partial_coverage.len(), 1);
        assert!((report.partial_coverage[0].1 - 0.5).abs() < 1e-12);
        // Weights are normalized over the covered part, so the mass still lands.
        assert_eq!(layer.amount(ids()[1], "pop"), Some(10.0));
    }

    #[test]
    fn rerun_after_reset_is_identical_and_without_reset_doubles() {
        let (mut layer, index) = layer_xy();
        let regions = vec![SourceRegion::new("B", rect(0.4, 0.0, 1.4, 1.0)).with_attribute("pop", 200.0)];

        distribute(&regions, &mut layer, &index, &sequential()).unwrap();
        let first = layer.totals();

        layer.reset();
        distribute(&regions, &mut layer, &index, &sequential()).unwrap();
        assert_eq!(layer.totals(), first);

        distribute(&regions, &mut layer, &index, &sequential()).unwrap();
        let doubled: Vec<f64> = first.iter().map(|v| v * 2.0).collect();
        assert_eq!(layer.totals(), doubled);
    }

    #[test]
    fn invalid_arguments_touch_nothing() {
        let (mut layer, index) = layer_xy();

        assert!(matches!(distribute(&[], &mut layer, &index, &sequential()), Err(Error::InvalidArgument(_))));

        let negative = vec![
            SourceRegion::new("ok", rect(0.1, 0.1, 0.9, 0.9)).with_attribute("pop", 5.0),
            SourceRegion::new("bad", rect(0.1, 0.1, 0.9, 0.9)).with_attribute("pop", -1.0),
        ];
        assert!(matches!(distribute(&negative, &mut layer, &index, &sequential()), Err(Error::InvalidArgument(_))));

        let nan = vec![SourceRegion::new("nan", rect(0.1, 0.1, 0.9, 0.9)).with_attribute("pop", f64::NAN)];
        assert!(matches!(distribute(&nan, &mut layer, &index, &sequential()), Err(Error::InvalidArgument(_))));

        let other_index = SpatialIndex::build(&layer.cells()[..1]);
        let ok = vec![SourceRegion::new("ok", rect(0.1, 0.1, 0.9, 0.9)).with_attribute("pop", 5.0)];
        assert!(matches!(distribute(&ok, &mut layer, &other_index, &sequential()), Err(Error::InvalidArgument(_))));

        assert_eq!(layer.totals(), vec![0.0, 0.0]);
    }

    #[test]
    fn parallel_and_sequential_agree_exactly() {
        let ids = ids();
        let cells: Vec<Cell> = (0..16)
            .map(|i| {
                let (x, y) = ((i % 4) as f64, (i / 4) as f64);
                Cell::new(ids[i], rect(x, y, x + 1.0, y + 1.0))
            })
            .collect();
        let index = SpatialIndex::build(&cells);
        let mut seq = CellLayer::new(cells.clone(), &["pop".to_string()]).unwrap();
        let mut par = CellLayer::new(cells, &["pop".to_string()]).unwrap();

        let regions: Vec<SourceRegion> = (0..40)
            .map(|i| {
                let x = (i as f64 * 0.37) % 3.0;
                let y = (i as f64 * 0.61) % 3.0;
                SourceRegion::new(format!("r{i}"), rect(x, y, x + 0.9, y + 0.7)).with_attribute("pop", 10.0 + i as f64)
            })
            .collect();

        distribute(&regions, &mut seq, &index, &sequential()).unwrap();
        distribute(&regions, &mut par, &index, &DistributeOptions::default()).unwrap();
        assert_eq!(seq.totals(), par.totals());
    }
}
