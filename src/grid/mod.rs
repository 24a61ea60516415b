mod cell;
mod layer;
mod tiling;

pub use cell::{Cell, CellId};
pub use layer::{AttributeMatrix, CellLayer};
pub use tiling::{generate_coverage, Coverage};

pub(crate) use cell::resolution;
pub(crate) use tiling::cover_regions;
