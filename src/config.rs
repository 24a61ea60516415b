use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::distribute::DistributeOptions;
use crate::error::Error;
use crate::score::ScoringMethod;

/// Age/sex bands of the ACS school-age population table.
pub const DEFAULT_ATTRIBUTES: [&str; 10] = [
    "Estimate!!Total:!!Male:!!Under 5 years",
    "Estimate!!Total:!!Male:!!5 to 9 years",
    "Estimate!!Total:!!Male:!!10 to 14 years",
    "Estimate!!Total:!!Male:!!15 to 17 years",
    "Estimate!!Total:!!Male:!!18 and 19 years",
    "Estimate!!Total:!!Female:!!Under 5 years",
    "Estimate!!Total:!!Female:!!5 to 9 years",
    "Estimate!!Total:!!Female:!!10 to 14 years",
    "Estimate!!Total:!!Female:!!15 to 17 years",
    "Estimate!!Total:!!Female:!!18 and 19 years",
];

/// Parameters of one tiling + distribution + scoring run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// H3 resolution, 1..=15.
    pub resolution: u8,
    pub method: ScoringMethod,
    /// Attributes to redistribute.
    pub attributes: Vec<String>,
    /// Overlaps at or below this fraction of a region's area are ignored.
    pub area_epsilon: f64,
    pub parallel: bool,
    /// Run the external smoothing pass after scoring.
    pub smooth: bool,
    /// Points per axis of the smoothing grid.
    pub smoothing_grid: usize,
    pub verbose: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            resolution: 7,
            method: ScoringMethod::Density,
            attributes: DEFAULT_ATTRIBUTES.iter().map(|s| s.to_string()).collect(),
            area_epsilon: 1e-12,
            parallel: true,
            smooth: false,
            smoothing_grid: 100,
            verbose: 0,
        }
    }
}

impl Options {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("Failed to parse options JSON")
    }

    /// Read options from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read options file: {}", path.display()))?;
        Self::from_json(&bytes)
    }

    /// Reject parameters no run could use.
    pub fn validate(&self) -> Result<(), Error> {
        crate::grid::resolution(self.resolution)?;
        if self.attributes.is_empty() {
            return Err(Error::invalid("attribute set is empty"))
        }
        if !(self.area_epsilon >= 0.0 && self.area_epsilon.is_finite()) {
            return Err(Error::invalid(format!("area epsilon {} must be finite and non-negative", self.area_epsilon)))
        }
        if self.smooth && self.smoothing_grid < 2 {
            return Err(Error::invalid(format!("smoothing grid size {} must be at least 2", self.smoothing_grid)))
        }
        Ok(())
    }

    /// The subset of options the distribution pass needs.
    pub fn distribute_options(&self) -> DistributeOptions {
        DistributeOptions { area_epsilon: self.area_epsilon, parallel: self.parallel, verbose: self.verbose }
    }
}
