//! Connected groups of `Occupied` cells.
//!
//! Ships are straight and never touch, so every 4-connected cluster of hits
//! belongs to a single ship.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

use crate::bitboard::CellMask;
use crate::common::CellStatus;
use crate::grid::Grid;

/// A maximal 4-connected set of `Occupied` cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupiedGroup {
    /// Linear cell indices in BFS discovery order.
    pub cells: Vec<usize>,
    pub mask: CellMask,
}

impl OccupiedGroup {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Partition all `Occupied` cells into groups, scanning row-major.
pub fn occupied_groups(grid: &Grid) -> Vec<OccupiedGroup> {
    let mut visited = vec![false; grid.len()];
    let mut groups = Vec::new();
    for start in 0..grid.len() {
        if visited[start] || grid.status_at(start) != CellStatus::Occupied {
            continue;
        }
        groups.push(flood(grid, start, &mut visited));
    }
    groups
}

/// The group `index` would belong to if it were `Occupied`.
pub fn group_from(grid: &Grid, index: usize) -> OccupiedGroup {
    let mut visited = vec![false; grid.len()];
    flood(grid, index, &mut visited)
}

fn flood(grid: &Grid, start: usize, visited: &mut [bool]) -> OccupiedGroup {
    let mut cells = Vec::new();
    let mut mask = CellMask::new();
    let mut queue = VecDeque::from([start]);
    visited[start] = true;
    while let Some(current) = queue.pop_front() {
        cells.push(current);
        let _ = mask.set(current);
        for n in grid.neighbours4(current) {
            if !visited[n] && grid.status_at(n) == CellStatus::Occupied {
                visited[n] = true;
                queue.push_back(n);
            }
        }
    }
    OccupiedGroup { cells, mask }
}
