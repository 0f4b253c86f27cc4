use rand::Rng;

use crate::{
    common::{Cell, EngineError, GridError, ProbeOutcome},
    config::EngineConfig,
    grid::Grid,
    probability::{recompute_with, ProbabilityMap},
    selector::{select_focused_move, select_move_with, TieBreak, UnknownNeighbours},
};

/// Current status of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum GameStatus {
    /// Ships remain to be found.
    Active,
    /// Every ship has been resolved.
    Won,
}

/// Grid knowledge bundled with the engine settings used to search it.
pub struct Solver<P: TieBreak = UnknownNeighbours> {
    grid: Grid,
    config: EngineConfig,
    policy: P,
    focused: bool,
    shots: usize,
}

impl Solver {
    /// Create a solver with the default configuration and tie-break.
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            config: EngineConfig::default(),
            policy: UnknownNeighbours,
            focused: false,
            shots: 0,
        }
    }
}

impl<P: TieBreak> Solver<P> {
    /// Replace the counting limits.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the tie-break policy.
    pub fn with_policy<Q: TieBreak>(self, policy: Q) -> Solver<Q> {
        Solver {
            grid: self.grid,
            config: self.config,
            policy,
            focused: self.focused,
            shots: self.shots,
        }
    }

    /// Only consider [`focus_cells`](crate::focus_cells) when choosing probes.
    pub fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Probes recorded so far.
    pub fn shots(&self) -> usize {
        self.shots
    }

    pub fn status(&self) -> GameStatus {
        self.grid.status()
    }

    /// Occupancy map of the current grid.
    pub fn recompute(&self) -> Result<ProbabilityMap, EngineError> {
        recompute_with(&self.grid, &self.config)
    }

    /// Recompute and choose the next probe.
    pub fn next_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<(Cell, ProbabilityMap), EngineError> {
        let map = self.recompute()?;
        let cell = if self.focused {
            select_focused_move(&map, &self.grid, &self.policy, rng)?
        } else {
            select_move_with(&map, &self.grid, &self.policy, rng)?
        };
        Ok((cell, map))
    }

    /// Record the outcome of probing `cell`.
    pub fn apply_result(&mut self, cell: Cell, outcome: ProbeOutcome) -> Result<(), GridError> {
        self.grid.apply_result(cell, outcome)?;
        self.shots += 1;
        Ok(())
    }

    /// Give back the grid.
    pub fn into_grid(self) -> Grid {
        self.grid
    }
}
