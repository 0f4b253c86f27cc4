//! Grid knowledge state: cell statuses and the ships still afloat.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use crate::bitboard::CellMask;
use crate::common::{Cell, CellStatus, GridError, ProbeOutcome};
use crate::config::{total_ship_cells, BOARD_SIZE, STANDARD_FLEET};
use crate::game::GameStatus;
use crate::groups::group_from;
use crate::placement::padding;

/// Everything the solver knows about the hidden board.
///
/// Cells are stored row-major. The remaining ship lengths are kept sorted in
/// descending order.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(try_from = "GridState"))]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellStatus>,
    remaining: Vec<usize>,
}

impl Grid {
    /// Create an all-`Unknown` grid with the given fleet still to find.
    pub fn new(width: usize, height: usize, ship_lengths: &[usize]) -> Result<Self, GridError> {
        let n_cells = check_shape(width, height, ship_lengths)?;
        let mut remaining = ship_lengths.to_vec();
        remaining.sort_unstable_by(|a, b| b.cmp(a));
        Ok(Grid {
            width,
            height,
            cells: vec![CellStatus::Unknown; n_cells],
            remaining,
        })
    }

    /// The classic 10×10 game with the standard five-ship fleet.
    pub fn standard() -> Self {
        Grid {
            width: BOARD_SIZE,
            height: BOARD_SIZE,
            cells: vec![CellStatus::Unknown; BOARD_SIZE * BOARD_SIZE],
            remaining: STANDARD_FLEET.to_vec(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of cells on the grid.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Lengths of ships not yet resolved, longest first.
    pub fn remaining_ship_lengths(&self) -> &[usize] {
        &self.remaining
    }

    /// Ship segments not yet resolved, including `Occupied` ones.
    pub fn total_remaining_cells(&self) -> usize {
        total_ship_cells(&self.remaining)
    }

    /// `Won` once every ship has been resolved.
    pub fn status(&self) -> GameStatus {
        if self.remaining.is_empty() {
            GameStatus::Won
        } else {
            GameStatus::Active
        }
    }

    /// Linear index of `(row, col)`.
    pub fn index(&self, (row, col): Cell) -> Result<usize, GridError> {
        if row >= self.height || col >= self.width {
            return Err(GridError::OutOfBounds { row, col });
        }
        Ok(row * self.width + col)
    }

    /// `(row, col)` of a linear index.
    #[inline]
    pub fn cell_at(&self, index: usize) -> Cell {
        (index / self.width, index % self.width)
    }

    /// Status of `(row, col)`, `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<CellStatus> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.cells[row * self.width + col])
    }

    /// Status by linear index.
    #[inline]
    pub fn status_at(&self, index: usize) -> CellStatus {
        self.cells[index]
    }

    /// Overwrite a cell without any inference. Meant for building positions.
    pub fn set_status(&mut self, cell: Cell, status: CellStatus) -> Result<(), GridError> {
        let idx = self.index(cell)?;
        self.cells[idx] = status;
        Ok(())
    }

    /// Mask of every cell with the given status.
    pub fn mask_of(&self, status: CellStatus) -> CellMask {
        let mut mask = CellMask::new();
        for (idx, &s) in self.cells.iter().enumerate() {
            if s == status {
                // Capacity was checked when the grid was built.
                let _ = mask.set(idx);
            }
        }
        mask
    }

    /// Orthogonal neighbours in the order up, down, left, right.
    pub fn neighbours4(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let (r, c) = self.cell_at(index);
        const DIRS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        DIRS.into_iter().filter_map(move |d| self.offset(r, c, d))
    }

    /// Diagonal neighbours.
    pub fn diagonals(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let (r, c) = self.cell_at(index);
        const DIRS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];
        DIRS.into_iter().filter_map(move |d| self.offset(r, c, d))
    }

    fn offset(&self, r: usize, c: usize, (dr, dc): (isize, isize)) -> Option<usize> {
        let rr = r.checked_add_signed(dr)?;
        let cc = c.checked_add_signed(dc)?;
        (rr < self.height && cc < self.width).then(|| rr * self.width + cc)
    }

    /// Record the outcome of probing `cell`.
    ///
    /// Only `Unknown` cells may be probed. A hit also marks the `Unknown`
    /// diagonal neighbours as `Miss`: a straight ship that may not touch
    /// another one can never occupy them. Sinking a ship resolves its whole
    /// group, turns its halo to `Miss` and removes one matching length. All
    /// checks run before the grid is touched.
    pub fn apply_result(&mut self, cell: Cell, outcome: ProbeOutcome) -> Result<(), GridError> {
        let idx = self.index(cell)?;
        let current = self.cells[idx];
        if current != CellStatus::Unknown {
            return Err(GridError::InvalidProbe {
                row: cell.0,
                col: cell.1,
                status: current,
            });
        }
        match outcome {
            ProbeOutcome::Miss => {
                self.cells[idx] = CellStatus::Miss;
            }
            ProbeOutcome::Occupied => {
                self.cells[idx] = CellStatus::Occupied;
                let diagonals: Vec<usize> = self.diagonals(idx).collect();
                for d in diagonals {
                    if self.cells[d] == CellStatus::Unknown {
                        self.cells[d] = CellStatus::Miss;
                    }
                }
            }
            ProbeOutcome::ShipResolved(len) => {
                let slot = self
                    .remaining
                    .iter()
                    .position(|&l| l == len)
                    .ok_or(GridError::UnknownShipLength(len))?;
                let group = group_from(self, idx);
                if group.len() != len {
                    return Err(GridError::LengthMismatch {
                        expected: len,
                        found: group.len(),
                    });
                }
                if !self.is_straight(&group.cells) {
                    return Err(GridError::NotStraight);
                }
                let halo = padding(self.width, self.height, group.mask);
                if halo
                    .iter_set_bits()
                    .any(|h| self.cells[h].is_ship_evidence())
                {
                    return Err(GridError::ShipsTouching);
                }
                for &g in &group.cells {
                    self.cells[g] = CellStatus::Resolved;
                }
                for h in halo.iter_set_bits() {
                    self.cells[h] = CellStatus::Miss;
                }
                self.remaining.remove(slot);
                log::debug!(
                    "resolved ship of length {} at {:?}, {} ships left",
                    len,
                    cell,
                    self.remaining.len()
                );
            }
        }
        Ok(())
    }

    fn is_straight(&self, cells: &[usize]) -> bool {
        let mut rows = cells.iter().map(|&i| i / self.width);
        let mut cols = cells.iter().map(|&i| i % self.width);
        let first = match cells.first() {
            Some(&i) => self.cell_at(i),
            None => return true,
        };
        rows.all(|r| r == first.0) || cols.all(|c| c == first.1)
    }
}

/// Number of cells of a `width` × `height` grid, once the dimensions and
/// ship lengths are known to be usable.
fn check_shape(width: usize, height: usize, ship_lengths: &[usize]) -> Result<usize, GridError> {
    let n_cells = width
        .checked_mul(height)
        .ok_or(GridError::TooLarge { width, height })?;
    if n_cells == 0 || n_cells > CellMask::capacity() {
        return Err(GridError::TooLarge { width, height });
    }
    for &len in ship_lengths {
        if len == 0 || len > width.max(height) {
            return Err(GridError::InvalidShipLength(len));
        }
    }
    Ok(n_cells)
}

/// Persisted form of a [`Grid`], checked on the way back in.
#[cfg(feature = "std")]
#[derive(serde::Deserialize)]
struct GridState {
    width: usize,
    height: usize,
    cells: Vec<CellStatus>,
    remaining: Vec<usize>,
}

#[cfg(feature = "std")]
impl TryFrom<GridState> for Grid {
    type Error = GridError;

    fn try_from(state: GridState) -> Result<Self, GridError> {
        let n_cells = check_shape(state.width, state.height, &state.remaining)?;
        if state.cells.len() != n_cells {
            return Err(GridError::CellCountMismatch {
                expected: n_cells,
                found: state.cells.len(),
            });
        }
        let mut remaining = state.remaining;
        remaining.sort_unstable_by(|a, b| b.cmp(a));
        Ok(Grid {
            width: state.width,
            height: state.height,
            cells: state.cells,
            remaining,
        })
    }
}

/// Free-function form of [`Grid::apply_result`].
pub fn apply_result(grid: &mut Grid, cell: Cell, outcome: ProbeOutcome) -> Result<(), GridError> {
    grid.apply_result(cell, outcome)
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Grid {}x{} remaining {:?}",
            self.width, self.height, self.remaining
        )?;
        for row in self.cells.chunks(self.width) {
            for s in row {
                let ch = match s {
                    CellStatus::Unknown => '.',
                    CellStatus::Miss => 'o',
                    CellStatus::Occupied => 'x',
                    CellStatus::Resolved => '#',
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
