#![doc = "Area-weighted redistribution of region counts onto an H3 hexagon grid, with composite scoring"]
mod common;
mod config;
mod distribute;
mod error;
mod grid;
mod hexmap;
mod index;
mod region;
mod score;
mod smooth;

#[doc(inline)]
pub use common::{
    read_regions_from_geojson, read_regions_from_geojson_bytes, write_scores_to_geojson, write_scores_to_geojson_bytes,
};

#[doc(inline)]
pub use config::{Options, DEFAULT_ATTRIBUTES};

#[doc(inline)]
pub use distribute::{allocate, distribute, DistributeOptions, DistributionReport, RegionAllocation};

#[doc(inline)]
pub use error::{Error, GeometryError, SkippedRegion};

#[doc(inline)]
pub use grid::{generate_coverage, AttributeMatrix, Cell, CellId, CellLayer, Coverage};

#[doc(inline)]
pub use hexmap::{Evaluation, HexMap};

#[doc(inline)]
pub use index::SpatialIndex;

#[doc(inline)]
pub use region::{RegionId, SourceRegion};

#[doc(inline)]
pub use score::{mean, percentile_ranks, score, score_by_name, std_dev, z_scores, ScoredCell, Scores, ScoringMethod, Summary};

#[doc(inline)]
pub use smooth::{SmoothedGrid, Smoother, SmoothingInput};
