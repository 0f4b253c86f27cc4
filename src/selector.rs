// Move selection over a probability map.
// The random source is always supplied by the caller.

use alloc::vec::Vec;
use rand::Rng;

use crate::bitboard::CellMask;
use crate::common::{Cell, CellStatus, EngineError};
use crate::grid::Grid;
use crate::placement::generate_placements;
use crate::probability::ProbabilityMap;

/// Relative tolerance under which two probabilities count as tied.
const TIE_EPSILON: f64 = 1e-9;

/// Secondary ranking among cells of equal probability. Higher wins.
pub trait TieBreak {
    fn score(&self, grid: &Grid, cell: Cell) -> i64;
}

/// Prefer cells with more orthogonal `Unknown` neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnknownNeighbours;

impl TieBreak for UnknownNeighbours {
    fn score(&self, grid: &Grid, cell: Cell) -> i64 {
        let Ok(idx) = grid.index(cell) else { return 0 };
        grid.neighbours4(idx)
            .filter(|&n| grid.status_at(n) == CellStatus::Unknown)
            .count() as i64
    }
}

/// Prefer cells with more diagonal `Unknown` neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagonalUnknowns;

impl TieBreak for DiagonalUnknowns {
    fn score(&self, grid: &Grid, cell: Cell) -> i64 {
        let Ok(idx) = grid.index(cell) else { return 0 };
        grid.diagonals(idx)
            .filter(|&n| grid.status_at(n) == CellStatus::Unknown)
            .count() as i64
    }
}

/// Prefer cells closer to the centre of the grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentreDistance;

impl TieBreak for CentreDistance {
    fn score(&self, grid: &Grid, (row, col): Cell) -> i64 {
        // doubled coordinates keep the centre integral
        let dr = 2 * row as i64 - (grid.height() as i64 - 1);
        let dc = 2 * col as i64 - (grid.width() as i64 - 1);
        -(dr * dr + dc * dc)
    }
}

impl<T: TieBreak + ?Sized> TieBreak for &T {
    fn score(&self, grid: &Grid, cell: Cell) -> i64 {
        (**self).score(grid, cell)
    }
}

fn check_dimensions(map: &ProbabilityMap, grid: &Grid) -> Result<(), EngineError> {
    if map.dimensions() != grid.dimensions() {
        return Err(EngineError::DimensionMismatch {
            map: map.dimensions(),
            grid: grid.dimensions(),
        });
    }
    Ok(())
}

#[inline]
fn tied(a: f64, b: f64) -> bool {
    libm::fabs(a - b) <= TIE_EPSILON * libm::fmax(1.0, libm::fabs(a).max(libm::fabs(b)))
}

/// Pick the next probe with the default [`UnknownNeighbours`] tie-break.
pub fn select_move<R: Rng + ?Sized>(
    map: &ProbabilityMap,
    grid: &Grid,
    rng: &mut R,
) -> Result<Cell, EngineError> {
    select_move_with(map, grid, &UnknownNeighbours, rng)
}

/// Pick the `Unknown` cell of highest probability; ties go to the policy's
/// best score, then to a uniform draw from `rng`.
pub fn select_move_with<P, R>(
    map: &ProbabilityMap,
    grid: &Grid,
    policy: &P,
    rng: &mut R,
) -> Result<Cell, EngineError>
where
    P: TieBreak + ?Sized,
    R: Rng + ?Sized,
{
    check_dimensions(map, grid)?;
    pick_best(map, grid, grid.mask_of(CellStatus::Unknown), policy, rng)
}

/// Unknown cells a focused search looks at: those covered by some placement
/// of the smallest remaining ship, plus those orthogonally next to an
/// `Occupied` cell.
pub fn focus_cells(grid: &Grid) -> CellMask {
    let mut focus = CellMask::new();
    if let Some(&smallest) = grid.remaining_ship_lengths().last() {
        for p in generate_placements(grid, smallest) {
            focus |= p.cells();
        }
    }
    for idx in grid.mask_of(CellStatus::Occupied).iter_set_bits() {
        for n in grid.neighbours4(idx) {
            let _ = focus.set(n);
        }
    }
    focus & grid.mask_of(CellStatus::Unknown)
}

/// Like [`select_move_with`], restricted to [`focus_cells`]. Uses every
/// `Unknown` cell when the focus is empty.
pub fn select_focused_move<P, R>(
    map: &ProbabilityMap,
    grid: &Grid,
    policy: &P,
    rng: &mut R,
) -> Result<Cell, EngineError>
where
    P: TieBreak + ?Sized,
    R: Rng + ?Sized,
{
    check_dimensions(map, grid)?;
    let focus = focus_cells(grid);
    let candidates = if focus.is_empty() {
        grid.mask_of(CellStatus::Unknown)
    } else {
        focus
    };
    pick_best(map, grid, candidates, policy, rng)
}

fn pick_best<P, R>(
    map: &ProbabilityMap,
    grid: &Grid,
    candidates: CellMask,
    policy: &P,
    rng: &mut R,
) -> Result<Cell, EngineError>
where
    P: TieBreak + ?Sized,
    R: Rng + ?Sized,
{
    let unknown: Vec<(usize, f64)> = candidates
        .iter_set_bits()
        .map(|i| (i, map.values()[i]))
        .collect();
    let best = unknown
        .iter()
        .map(|&(_, v)| v)
        .fold(f64::NEG_INFINITY, f64::max);
    if unknown.is_empty() {
        return Err(EngineError::NoCandidate);
    }

    let mut ties: Vec<Cell> = Vec::new();
    let mut top_score = i64::MIN;
    for &(i, v) in &unknown {
        if !tied(v, best) {
            continue;
        }
        let cell = grid.cell_at(i);
        let score = policy.score(grid, cell);
        if score > top_score {
            top_score = score;
            ties.clear();
        }
        if score == top_score {
            ties.push(cell);
        }
    }
    log::trace!("{} tied candidates at p={:.4}", ties.len(), best);
    let pick = rng.random_range(0..ties.len());
    Ok(ties[pick])
}

/// Sample an `Unknown` cell with weight `(p / p_max)^(1/temperature)`.
///
/// Lower temperatures concentrate on the likeliest cells. Falls back to a
/// uniform draw when every weight is zero. `temperature` must be positive.
pub fn sample_move<R: Rng + ?Sized>(
    map: &ProbabilityMap,
    grid: &Grid,
    temperature: f64,
    rng: &mut R,
) -> Result<Cell, EngineError> {
    check_dimensions(map, grid)?;
    if !(temperature > 0.0) {
        return Err(EngineError::InvalidTemperature);
    }
    let unknown: Vec<(usize, f64)> = map
        .values()
        .iter()
        .enumerate()
        .filter(|&(i, _)| grid.status_at(i) == CellStatus::Unknown)
        .map(|(i, &v)| (i, v.max(0.0)))
        .collect();
    if unknown.is_empty() {
        return Err(EngineError::NoCandidate);
    }
    let peak = unknown.iter().map(|&(_, v)| v).fold(0.0, f64::max);
    if !(peak > 0.0) || !peak.is_finite() {
        let pick = rng.random_range(0..unknown.len());
        return Ok(grid.cell_at(unknown[pick].0));
    }
    // Relative weights stay in [0, 1], the peak cell at exactly 1.
    let exponent = 1.0 / temperature;
    let weighted: Vec<(usize, f64)> = unknown
        .into_iter()
        .map(|(i, v)| (i, libm::pow(v / peak, exponent)))
        .collect();
    let total: f64 = weighted.iter().map(|&(_, w)| w).sum();
    let threshold: f64 = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for &(i, w) in &weighted {
        cumulative += w;
        if threshold < cumulative {
            return Ok(grid.cell_at(i));
        }
    }
    let (last, _) = weighted[weighted.len() - 1];
    Ok(grid.cell_at(last))
}
