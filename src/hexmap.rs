use anyhow::Result;

use crate::config::Options;
use crate::distribute::{check_counts, distribute, DistributionReport};
use crate::error::{Error, SkippedRegion};
use crate::grid::{cover_regions, CellLayer};
use crate::index::SpatialIndex;
use crate::region::SourceRegion;
use crate::score::{score, ScoringMethod, Scores, Summary};
use crate::smooth::{SmoothedGrid, Smoother, SmoothingInput};

/// Cells of one tiling with redistributed counts, plus the index over them.
/// Built once by `HexMap::build`; scoring borrows it and never mutates it.
#[derive(Debug, Clone)]
pub struct HexMap {
    options: Options,
    layer: CellLayer,
    index: SpatialIndex,
    coverage_skipped: Vec<SkippedRegion>,
    report: DistributionReport,
}

/// Scores of one method plus the optional smoothed surface.
#[derive(Debug, Clone)]
pub struct Evaluation<'a> {
    pub scores: Scores<'a>,
    pub summary: Summary,
    pub smoothed: Option<SmoothedGrid>,
}

impl HexMap {
    /// Tile the regions, index the cells and redistribute the counts.
    /// Argument errors are raised before any tiling work starts.
    pub fn build(regions: &[SourceRegion], options: Options) -> Result<Self, Error> {
        options.validate()?;
        if regions.is_empty() {
            return Err(Error::invalid("region set is empty"))
        }
        check_counts(regions, &options.attributes)?;

        if options.verbose > 0 {
            eprintln!("[tiling] {} regions at resolution {}", regions.len(), options.resolution);
        }
        let coverage = cover_regions(regions, options.resolution, options.parallel)?;
        if options.verbose > 0 {
            eprintln!("[tiling] {} cells, {} regions skipped", coverage.cells.len(), coverage.skipped.len());
        }

        let mut layer = CellLayer::from_ids(coverage.cells, &options.attributes)?;
        let index = SpatialIndex::build(layer.cells());
        let report = distribute(regions, &mut layer, &index, &options.distribute_options())?;

        Ok(Self { options, layer, index, coverage_skipped: coverage.skipped, report })
    }

    #[inline] pub fn options(&self) -> &Options { &self.options }

    #[inline] pub fn layer(&self) -> &CellLayer { &self.layer }

    #[inline] pub fn index(&self) -> &SpatialIndex { &self.index }

    /// Report of the latest distribution pass.
    #[inline] pub fn report(&self) -> &DistributionReport { &self.report }

    /// Regions the tiling step could not use.
    #[inline] pub fn coverage_skipped(&self) -> &[SkippedRegion] { &self.coverage_skipped }

    /// Zero the cells and distribute `regions` again over the same tiling.
    pub fn redistribute(&mut self, regions: &[SourceRegion]) -> Result<&DistributionReport, Error> {
        check_counts(regions, self.layer.attributes())?;
        let options = self.options.distribute_options();
        let mut layer = self.layer.clone();
        layer.reset();
        self.report = distribute(regions, &mut layer, &self.index, &options)?;
        self.layer = layer;
        Ok(&self.report)
    }

    /// Score every cell with `method`.
    pub fn score(&self, method: ScoringMethod) -> Scores<'_> {
        let scores = score(&self.layer, method);
        if self.options.verbose > 0 { eprintln!("[score] {}", scores.summary()); }
        scores
    }

    /// Score with `method`, then smooth the scores when a smoother is given.
    pub fn evaluate(&self, method: ScoringMethod, smoother: Option<&dyn Smoother>) -> Result<Evaluation<'_>> {
        let scores = self.score(method);
        let summary = scores.summary();
        let smoothed = match smoother {
            Some(smoother) => {
                let input = SmoothingInput::from_scores(&scores, self.options.smoothing_grid)?;
                Some(smoother.smooth(&input)?)
            }
            None => None,
        };
        Ok(Evaluation { scores, summary, smoothed })
    }

    /// Evaluate with the configured method and smoothing flag.
    /// Requesting smoothing without a smoother is an argument error.
    pub fn run(&self, smoother: Option<&dyn Smoother>) -> Result<Evaluation<'_>> {
        match (self.options.smooth, smoother) {
            (true, None) => Err(Error::invalid("smoothing requested but no smoother supplied").into()),
            (true, Some(smoother)) => self.evaluate(self.options.method, Some(smoother)),
            (false, _) => self.evaluate(self.options.method, None),
        }
    }
}
