//! Commonly used types and utilities for ease of import.

pub use crate::{
    apply_result, recompute, recompute_with, select_move, select_move_with, Cell, CellStatus,
    EngineConfig, EngineError, GameStatus, Grid, GridError, ProbabilityMap, ProbeOutcome, Solver,
    TieBreak,
};

#[cfg(feature = "std")]
pub use crate::print_probability_map;
