//! Common types for the solver: cells, probe outcomes and errors.

use crate::bitboard::BitBoardError;

/// Grid coordinate as `(row, col)`.
pub type Cell = (usize, usize);

/// What is known about a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum CellStatus {
    /// Not probed and not inferred.
    #[default]
    Unknown,
    /// Confirmed empty water.
    Miss,
    /// Confirmed ship segment of a ship not yet identified.
    Occupied,
    /// Segment of a ship that has been fully sunk.
    Resolved,
}

impl CellStatus {
    /// Cells a placement may cover.
    #[inline]
    pub fn admits_ship(self) -> bool {
        matches!(self, CellStatus::Unknown | CellStatus::Occupied)
    }

    /// Cells that may not appear in a placement's padding halo.
    #[inline]
    pub fn is_ship_evidence(self) -> bool {
        matches!(self, CellStatus::Occupied | CellStatus::Resolved)
    }
}

/// Result of a probe reported by the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ProbeOutcome {
    /// Probe found water.
    Miss,
    /// Probe hit a ship that is still afloat.
    Occupied,
    /// Probe sank a ship of the given length.
    ShipResolved(usize),
}

/// Errors returned by grid construction and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Underlying bitboard error.
    BitBoardError(BitBoardError),
    /// Grid has a zero dimension or more cells than a mask can hold.
    TooLarge { width: usize, height: usize },
    /// Ship length is zero or fits in neither dimension.
    InvalidShipLength(usize),
    /// Cell lies outside the grid.
    OutOfBounds { row: usize, col: usize },
    /// Probed cell is not `Unknown`.
    InvalidProbe { row: usize, col: usize, status: CellStatus },
    /// Resolved length is not among the remaining ships.
    UnknownShipLength(usize),
    /// Resolved group size differs from the reported length.
    LengthMismatch { expected: usize, found: usize },
    /// Resolved group is not a straight line.
    NotStraight,
    /// Resolved ship touches other ship evidence.
    ShipsTouching,
    /// Stored cells do not match the grid dimensions.
    CellCountMismatch { expected: usize, found: usize },
}

impl From<BitBoardError> for GridError {
    fn from(err: BitBoardError) -> Self {
        GridError::BitBoardError(err)
    }
}

impl core::fmt::Display for GridError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GridError::BitBoardError(e) => write!(f, "BitBoard error: {}", e),
            GridError::TooLarge { width, height } => {
                write!(f, "Grid {}x{} is empty or exceeds the cell capacity", width, height)
            }
            GridError::InvalidShipLength(len) => write!(f, "Ship length {} cannot fit the grid", len),
            GridError::OutOfBounds { row, col } => write!(f, "Cell ({}, {}) is out of bounds", row, col),
            GridError::InvalidProbe { row, col, status } => {
                write!(f, "Cell ({}, {}) was already probed ({:?})", row, col, status)
            }
            GridError::UnknownShipLength(len) => write!(f, "No remaining ship has length {}", len),
            GridError::LengthMismatch { expected, found } => {
                write!(f, "Sunk ship should have {} cells, found {}", expected, found)
            }
            GridError::NotStraight => write!(f, "Sunk ship cells are not in a straight line"),
            GridError::ShipsTouching => write!(f, "Sunk ship touches another ship"),
            GridError::CellCountMismatch { expected, found } => {
                write!(f, "Grid should hold {} cells, found {}", expected, found)
            }
        }
    }
}

/// Why a grid admits no completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inconsistency {
    /// A remaining length has no legal placement.
    Unplaceable(usize),
    /// Placements exist but none of their combinations is a valid completion.
    NoCompletion,
}

/// Errors returned by the probability engine and move selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Grid knowledge contradicts the remaining fleet.
    InconsistentState(Inconsistency),
    /// Probability map was computed for a grid of different dimensions.
    DimensionMismatch {
        map: (usize, usize),
        grid: (usize, usize),
    },
    /// No `Unknown` cell is left to probe.
    NoCandidate,
    /// Sampling temperature is zero, negative or NaN.
    InvalidTemperature,
}

impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EngineError::InconsistentState(Inconsistency::Unplaceable(len)) => {
                write!(f, "Inconsistent state: no legal placement for length {}", len)
            }
            EngineError::InconsistentState(Inconsistency::NoCompletion) => {
                write!(f, "Inconsistent state: no valid completion of the grid")
            }
            EngineError::DimensionMismatch { map, grid } => write!(
                f,
                "Probability map is {}x{} but grid is {}x{}",
                map.0, map.1, grid.0, grid.1
            ),
            EngineError::NoCandidate => write!(f, "No unknown cell left to probe"),
            EngineError::InvalidTemperature => write!(f, "Sampling temperature must be positive"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GridError {}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}
