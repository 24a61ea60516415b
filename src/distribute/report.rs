use std::fmt;

use crate::error::SkippedRegion;
use crate::region::RegionId;

/// What happened to every region in one distribution pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributionReport {
    /// Attribute names, in the order of the totals below.
    pub attributes: Vec<String>,
    /// Regions whose mass was assigned to at least one cell.
    pub distributed: usize,
    /// Regions with unusable geometry.
    pub skipped: Vec<SkippedRegion>,
    /// Regions with no positive-area overlap with any cell; their mass is lost.
    pub coverage_gaps: Vec<RegionId>,
    /// Regions only partly inside the tiling, with their covered area fraction.
    pub partial_coverage: Vec<(RegionId, f64)>,
    /// Per-attribute sum over all input regions.
    pub input_totals: Vec<f64>,
    /// Per-attribute sum actually added to cells in this pass.
    pub distributed_totals: Vec<f64>,
}

impl DistributionReport {
    #[inline] pub fn skipped_count(&self) -> usize { self.skipped.len() }

    #[inline] pub fn gap_count(&self) -> usize { self.coverage_gaps.len() }

    /// Input mass of `attribute` that did not reach any cell.
    pub fn undistributed(&self, attribute: &str) -> Option<f64> {
        let col = self.attributes.iter().position(|name| name == attribute)?;
        Some(self.input_totals[col] - self.distributed_totals[col])
    }

    /// True when every attribute's distributed total matches its input total
    /// within `rel_tol` (relative to the input total).
    pub fn is_conservative(&self, rel_tol: f64) -> bool {
        self.input_totals.iter().zip(self.distributed_totals.iter())
            .all(|(&input, &out)| (input - out).abs() <= rel_tol * input.abs().max(1.0))
    }
}

impl fmt::Display for DistributionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input: f64 = self.input_totals.iter().sum();
        let out: f64 = self.distributed_totals.iter().sum();
        write!(f, "distributed {} regions ({} skipped, {} outside coverage, {} partially covered); mass {:.3} of {:.3}",
            self.distributed, self.skipped.len(), self.coverage_gaps.len(), self.partial_coverage.len(), out, input)
    }
}
