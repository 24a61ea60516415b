mod stats;

use std::{fmt, str::FromStr};

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::grid::{Cell, CellLayer};

pub use stats::{mean, percentile_ranks, std_dev, z_scores};

/// How a cell's attribute totals are reduced to one comparable score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    /// Total over cell area.
    #[default]
    #[serde(alias = "total_density")]
    Density,
    /// Z-score of the total against all cells (population deviation).
    Normalized,
    /// Percentile rank of the total, ties averaged.
    Percentile,
}

impl ScoringMethod {
    pub const ALL: [ScoringMethod; 3] = [Self::Density, Self::Normalized, Self::Percentile];

    /// Name accepted by `from_str`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Density => "density",
            Self::Normalized => "normalized",
            Self::Percentile => "percentile",
        }
    }

    /// Human-readable label for legends and status lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Density => "Population Density (per sq degree)",
            Self::Normalized => "Normalized Score (Z-score)",
            Self::Percentile => "Percentile Rank",
        }
    }

    /// Scores for cells with the given totals and areas (same order).
    pub fn compute(&self, totals: &[f64], areas: &[f64]) -> Vec<f64> {
        debug_assert_eq!(totals.len(), areas.len());
        match self {
            Self::Density => totals.iter().zip(areas)
                .map(|(&total, &area)| if area > 0.0 { total / area } else { 0.0 })
                .collect(),
            Self::Normalized => z_scores(totals),
            Self::Percentile => percentile_ranks(totals),
        }
    }
}

impl FromStr for ScoringMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "density" | "total_density" => Ok(Self::Density),
            "normalized" => Ok(Self::Normalized),
            "percentile" => Ok(Self::Percentile),
            _ => Err(Error::invalid(format!(
                "unknown scoring method '{s}' (expected density, normalized or percentile)"
            ))),
        }
    }
}

impl fmt::Display for ScoringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// A cell with its derived total and composite score.
/// Borrows the layer; scoring never mutates cells.
#[derive(Debug, Clone)]
pub struct ScoredCell<'a> {
    pub cell: &'a Cell,
    pub amounts: ArrayView1<'a, f64>,
    pub total: f64,
    pub score: f64,
}

/// Scored cells for one method, in layer order.
#[derive(Debug, Clone)]
pub struct Scores<'a> {
    pub method: ScoringMethod,
    pub label: &'static str,
    pub attributes: &'a [String],
    pub cells: Vec<ScoredCell<'a>>,
}

impl<'a> Scores<'a> {
    #[inline] pub fn len(&self) -> usize { self.cells.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    pub fn summary(&self) -> Summary {
        let scores: Vec<f64> = self.cells.iter().map(|c| c.score).collect();
        Summary {
            total_population: self.cells.iter().map(|c| c.total).sum(),
            cell_count: self.cells.len(),
            mean_score: mean(&scores),
            label: self.label,
        }
    }
}

/// Figures for a status line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_population: f64,
    pub cell_count: usize,
    pub mean_score: f64,
    pub label: &'static str,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total Population: {} | Number of Hexagons: {} | Average Score: {:.2}",
            thousands(self.total_population.round() as i64), thousands(self.cell_count as i64), self.mean_score)
    }
}

/// Integer with comma thousands separators.
fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 { out.push('-') }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 { out.push(',') }
        out.push(ch);
    }
    out
}

/// Score every cell of `layer` with `method`.
pub fn score(layer: &CellLayer, method: ScoringMethod) -> Scores<'_> {
    let totals = layer.totals();
    let areas: Vec<f64> = layer.cells().iter().map(|c| c.area()).collect();
    let scores = method.compute(&totals, &areas);

    let cells = layer.cells().iter().enumerate()
        .zip(totals.into_iter().zip(scores))
        .map(|((i, cell), (total, score))| ScoredCell { cell, amounts: layer.amounts().row(i), total, score })
        .collect();

    Scores { method, label: method.label(), attributes: layer.attributes(), cells }
}

/// Score by method name; an unknown name fails before any cell is read.
pub fn score_by_name<'a>(layer: &'a CellLayer, method: &str) -> Result<Scores<'a>, Error> {
    let method: ScoringMethod = method.parse()?;
    Ok(score(layer, method))
}
