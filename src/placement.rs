//! Ship placements, the padding rule and the placement generator.

use alloc::vec::Vec;
use core::fmt;

use crate::bitboard::CellMask;
use crate::common::{Cell, CellStatus};
use crate::grid::Grid;

/// Orientation of a ship on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// One candidate position of a ship of a given length.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    length: usize,
    orientation: Orientation,
    row: usize,
    col: usize,
    cells: CellMask,
    halo: CellMask,
}

impl Placement {
    /// Build the placement starting at (`row`, `col`) on a `width × height`
    /// grid. Returns `None` if the run leaves the grid.
    pub fn new(
        width: usize,
        height: usize,
        length: usize,
        row: usize,
        col: usize,
        orientation: Orientation,
    ) -> Option<Self> {
        if length == 0 || width * height > CellMask::capacity() {
            return None;
        }
        let fits = match orientation {
            Orientation::Horizontal => row < height && col + length <= width,
            Orientation::Vertical => col < width && row + length <= height,
        };
        if !fits {
            return None;
        }
        let mut cells = CellMask::new();
        for i in 0..length {
            let (r, c) = match orientation {
                Orientation::Horizontal => (row, col + i),
                Orientation::Vertical => (row + i, col),
            };
            cells.set(r * width + c).ok()?;
        }
        Some(Placement {
            length,
            orientation,
            row,
            col,
            cells,
            halo: padding(width, height, cells),
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// First cell of the run.
    pub fn origin(&self) -> Cell {
        (self.row, self.col)
    }

    /// Cells covered by the ship.
    pub fn cells(&self) -> CellMask {
        self.cells
    }

    /// Neighbouring cells that must stay free of other ships.
    pub fn halo(&self) -> CellMask {
        self.halo
    }

    /// Cells plus halo.
    pub fn footprint(&self) -> CellMask {
        self.cells | self.halo
    }

    /// Covered cells as `(row, col)`, in order along the ship.
    pub fn iter_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.length).map(move |i| match self.orientation {
            Orientation::Horizontal => (self.row, self.col + i),
            Orientation::Vertical => (self.row + i, self.col),
        })
    }

    /// Two placements may share a board iff neither touches the other.
    #[inline]
    pub fn is_compatible_with(&self, other: &Placement) -> bool {
        !self.cells.intersects(&other.footprint())
    }
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Placement {{ length: {}, origin: ({}, {}), orientation: {:?} }}",
            self.length, self.row, self.col, self.orientation
        )
    }
}

/// Padding halo of a cell set: its 8-connected neighbours inside the grid,
/// excluding the set itself.
pub fn padding(width: usize, height: usize, cells: CellMask) -> CellMask {
    let mut halo = CellMask::new();
    for idx in cells.iter_set_bits() {
        let (r, c) = (idx / width, idx % width);
        for rr in r.saturating_sub(1)..=(r + 1).min(height - 1) {
            for cc in c.saturating_sub(1)..=(c + 1).min(width - 1) {
                let _ = halo.set(rr * width + cc);
            }
        }
    }
    halo.without(cells)
}

/// Every placement of `length` consistent with the grid.
///
/// A placement is kept when all its cells are `Unknown` or `Occupied`, at
/// least one is `Unknown`, and its halo holds no `Occupied` or `Resolved`
/// cell. Length one is only tried horizontally so each cell appears once.
pub fn generate_placements(grid: &Grid, length: usize) -> Vec<Placement> {
    let (width, height) = grid.dimensions();
    let unknown = grid.mask_of(CellStatus::Unknown);
    let open = unknown | grid.mask_of(CellStatus::Occupied);
    let evidence = grid.mask_of(CellStatus::Occupied) | grid.mask_of(CellStatus::Resolved);

    let orientations: &[Orientation] = if length == 1 {
        &[Orientation::Horizontal]
    } else {
        &[Orientation::Horizontal, Orientation::Vertical]
    };

    let mut placements = Vec::new();
    for row in 0..height {
        for col in 0..width {
            for &orientation in orientations {
                let Some(p) = Placement::new(width, height, length, row, col, orientation) else {
                    continue;
                };
                if p.cells.without(open).is_empty()
                    && p.cells.intersects(&unknown)
                    && !p.halo.intersects(&evidence)
                {
                    placements.push(p);
                }
            }
        }
    }
    placements
}
