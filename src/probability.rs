//! Per-cell occupancy map built from completion counts.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::common::{Cell, EngineError, Inconsistency};
use crate::compat::{CompatibilityIndex, PlacementArena};
use crate::config::EngineConfig;
use crate::counter::ConfigurationCounter;
use crate::grid::Grid;
use crate::groups::occupied_groups;

/// Which shortcuts were taken while counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Truncation {
    /// Conflicts between other ships were estimated pairwise.
    pub pairs_estimated: bool,
    /// Group-subset order the coverage expansion stopped at.
    pub group_order: Option<usize>,
    /// Cells whose raw weight came out negative and was clamped to zero.
    pub clamped_cells: usize,
    /// Some count exceeded `i128`.
    pub saturated: bool,
}

/// Whether a map is an exact expectation or an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Precision {
    Exact,
    Approximate(Truncation),
}

/// Expected number of ship segments on every cell.
///
/// Values sum to the number of remaining ship segments. With no `Occupied`
/// cell on the board each value is directly the probability of a hit;
/// `Occupied` cells read 1.0 in exact maps.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct ProbabilityMap {
    width: usize,
    height: usize,
    values: Vec<f64>,
    precision: Precision,
}

impl ProbabilityMap {
    /// All-zero exact map.
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
            precision: Precision::Exact,
        }
    }

    /// Exact map over caller-supplied row-major values.
    ///
    /// Returns `None` when `values` does not hold `width * height` entries.
    pub fn from_values(width: usize, height: usize, values: Vec<f64>) -> Option<Self> {
        if values.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            values,
            precision: Precision::Exact,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Value at (`row`, `col`), `None` outside the map.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.values[row * self.width + col])
    }

    /// Row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Rows of the map, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.width.max(1))
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn is_exact(&self) -> bool {
        self.precision == Precision::Exact
    }

    /// Cell with the highest value, first in row-major order on ties.
    pub fn argmax(&self) -> Option<Cell> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &v) in self.values.iter().enumerate() {
            if best.map_or(true, |(_, b)| v > b) {
                best = Some((i, v));
            }
        }
        best.map(|(i, _)| (i / self.width, i % self.width))
    }
}

impl fmt::Debug for ProbabilityMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ProbabilityMap {}x{} {:?}",
            self.width, self.height, self.precision
        )?;
        for row in self.rows() {
            for v in row {
                write!(f, " {:5.3}", v)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Recompute the occupancy map with the default configuration.
pub fn recompute(grid: &Grid) -> Result<ProbabilityMap, EngineError> {
    recompute_with(grid, &EngineConfig::default())
}

/// Recompute the occupancy map.
///
/// Runs the full pipeline on a read-only grid: placement generation,
/// occupied-group detection, compatibility index, completion counting and
/// normalisation.
pub fn recompute_with(grid: &Grid, config: &EngineConfig) -> Result<ProbabilityMap, EngineError> {
    let (width, height) = grid.dimensions();
    let total = grid.total_remaining_cells();
    let groups = occupied_groups(grid);
    if total == 0 {
        if !groups.is_empty() {
            return Err(EngineError::InconsistentState(Inconsistency::NoCompletion));
        }
        return Ok(ProbabilityMap::zeros(width, height));
    }

    let arena = PlacementArena::build(grid)?;
    let index = CompatibilityIndex::build(&arena);
    let counts = ConfigurationCounter::new(&arena, &index, *config).count(&groups);
    log::debug!(
        "{} placements, {} occupied groups, exact={}",
        arena.len(),
        groups.len(),
        counts.is_exact()
    );

    let mut raw = vec![0f64; grid.len()];
    for (id, &weight) in counts.per_placement.iter().enumerate() {
        if weight == 0 {
            continue;
        }
        for cell in arena.placement(id).cells().iter_set_bits() {
            raw[cell] += weight as f64;
        }
    }

    let mut clamped_cells = 0;
    for v in raw.iter_mut() {
        if *v < 0.0 {
            *v = 0.0;
            clamped_cells += 1;
        }
    }
    let sum: f64 = raw.iter().sum();
    if !(sum > 0.0) {
        return Err(EngineError::InconsistentState(Inconsistency::NoCompletion));
    }
    let scale = total as f64 / sum;
    let values: Vec<f64> = raw.into_iter().map(|v| v * scale).collect();

    let precision = if counts.is_exact() && clamped_cells == 0 {
        Precision::Exact
    } else {
        let truncation = Truncation {
            pairs_estimated: counts.pairs_estimated,
            group_order: counts.group_order,
            clamped_cells,
            saturated: counts.saturated,
        };
        log::warn!("probability map is approximate: {:?}", truncation);
        Precision::Approximate(truncation)
    };

    Ok(ProbabilityMap {
        width,
        height,
        values,
        precision,
    })
}
