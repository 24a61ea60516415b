use std::fmt;

use crate::region::RegionId;

/// Fatal errors, reported before any cell is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Unknown scoring method, out-of-range resolution, empty inputs, bad attribute values.
    InvalidArgument(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Why a region's geometry could not be used. Recoverable: the region is
/// skipped and reported, processing continues with the rest.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// No polygons at all.
    Empty,
    /// A non-areal geometry kind (point, line, ...).
    Unsupported(&'static str),
    /// A ring with fewer than four coordinates.
    TooFewPoints { part: usize, ring: usize, len: usize },
    /// A NaN or infinite coordinate.
    NonFinite { part: usize },
    /// Polygons enclosing no area.
    ZeroArea,
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::Empty => write!(f, "empty geometry"),
            GeometryError::Unsupported(kind) => write!(f, "unsupported geometry type {kind}"),
            GeometryError::TooFewPoints { part, ring, len } =>
                write!(f, "ring {ring} of part {part} has {len} coordinates (need at least 4)"),
            GeometryError::NonFinite { part } =>
                write!(f, "part {part} has a non-finite coordinate"),
            GeometryError::ZeroArea => write!(f, "geometry encloses zero area"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// A region left out of a run, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRegion {
    pub id: RegionId,
    pub reason: GeometryError,
}

impl fmt::Display for SkippedRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region {}: {}", self.id, self.reason)
    }
}
