use anyhow::Result;
use geo::Point;
use ndarray::Array2;

use crate::error::Error;
use crate::score::Scores;

/// Point samples and target grid handed to an external smoothing pass
/// (e.g. ordinary kriging).
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingInput {
    /// Cell centroids as (lon, lat).
    pub points: Vec<Point<f64>>,
    /// Composite score at each point.
    pub values: Vec<f64>,
    /// Evenly spaced grid longitudes spanning the points.
    pub grid_lon: Vec<f64>,
    /// Evenly spaced grid latitudes spanning the points.
    pub grid_lat: Vec<f64>,
}

impl SmoothingInput {
    /// Sample scored cells at their centroids, with a `grid_size` x `grid_size` target grid.
    pub fn from_scores(scores: &Scores<'_>, grid_size: usize) -> Result<Self, Error> {
        if grid_size < 2 {
            return Err(Error::invalid(format!("smoothing grid size {grid_size} must be at least 2")))
        }

        let (points, values): (Vec<Point<f64>>, Vec<f64>) = scores.cells.iter()
            .filter_map(|c| c.cell.centroid().map(|p| (p, c.score)))
            .unzip();
        if points.is_empty() {
            return Err(Error::invalid("no scored cells to smooth"))
        }

        let (min_lon, max_lon, min_lat, max_lat) = points.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
            |(x0, x1, y0, y1), p| (x0.min(p.x()), x1.max(p.x()), y0.min(p.y()), y1.max(p.y())),
        );

        Ok(Self {
            grid_lon: linspace(min_lon, max_lon, grid_size),
            grid_lat: linspace(min_lat, max_lat, grid_size),
            points,
            values,
        })
    }
}

/// Output of a smoothing pass; `values` is (grid_lat.len(), grid_lon.len()).
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedGrid {
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub values: Array2<f64>,
}

/// An interpolation method run after scoring. Implementations live outside this crate.
pub trait Smoother {
    fn smooth(&self, input: &SmoothingInput) -> Result<SmoothedGrid>;
}

/// `n` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| if i + 1 == n { end } else { start + step * i as f64 }).collect()
}
