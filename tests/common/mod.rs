#![allow(dead_code)]

use battleship_solver::{CellStatus, Grid};

/// Build a grid from rows of `.` (unknown), `o` (miss), `x` (occupied) and
/// `#` (resolved).
pub fn grid_from(rows: &[&str], ships: &[usize]) -> Grid {
    let height = rows.len();
    let width = rows[0].len();
    let mut grid = Grid::new(width, height, ships).unwrap();
    for (r, line) in rows.iter().enumerate() {
        for (c, ch) in line.chars().enumerate() {
            let status = match ch {
                '.' => CellStatus::Unknown,
                'o' => CellStatus::Miss,
                'x' => CellStatus::Occupied,
                '#' => CellStatus::Resolved,
                other => panic!("unexpected cell {other:?}"),
            };
            grid.set_status((r, c), status).unwrap();
        }
    }
    grid
}

fn touching(a: usize, b: usize, width: usize) -> bool {
    let (ra, ca) = (a / width, a % width);
    let (rb, cb) = (b / width, b % width);
    ra.abs_diff(rb) <= 1 && ca.abs_diff(cb) <= 1
}

/// Straight runs of `length` a ship could occupy, checked cell by cell.
pub fn runs(grid: &Grid, length: usize) -> Vec<Vec<usize>> {
    let (width, height) = grid.dimensions();
    let resolved: Vec<usize> = (0..grid.len())
        .filter(|&i| grid.status_at(i) == CellStatus::Resolved)
        .collect();
    let dirs: &[(usize, usize)] = if length == 1 { &[(0, 1)] } else { &[(0, 1), (1, 0)] };
    let mut out = Vec::new();
    for r in 0..height {
        for c in 0..width {
            for &(dr, dc) in dirs {
                if r + dr * (length - 1) >= height || c + dc * (length - 1) >= width {
                    continue;
                }
                let cells: Vec<usize> = (0..length)
                    .map(|i| (r + dr * i) * width + c + dc * i)
                    .collect();
                let open = cells.iter().all(|&i| {
                    matches!(grid.status_at(i), CellStatus::Unknown | CellStatus::Occupied)
                });
                let fresh = cells.iter().any(|&i| grid.status_at(i) == CellStatus::Unknown);
                let clear = cells
                    .iter()
                    .all(|&i| resolved.iter().all(|&s| !touching(i, s, width)));
                if open && fresh && clear {
                    out.push(cells);
                }
            }
        }
    }
    out
}

/// Expected segments per cell over every fleet layout consistent with the
/// grid, by plain enumeration. `None` when no layout exists.
pub fn brute_force(grid: &Grid) -> Option<Vec<f64>> {
    let lengths = grid.remaining_ship_lengths().to_vec();
    let width = grid.width();
    let occupied: Vec<usize> = (0..grid.len())
        .filter(|&i| grid.status_at(i) == CellStatus::Occupied)
        .collect();
    let per_ship: Vec<Vec<Vec<usize>>> = lengths.iter().map(|&l| runs(grid, l)).collect();

    struct Walk<'a> {
        lengths: &'a [usize],
        per_ship: &'a [Vec<Vec<usize>>],
        occupied: &'a [usize],
        width: usize,
        chosen: Vec<&'a [usize]>,
        hits: Vec<u64>,
        total: u64,
    }

    fn place<'a>(w: &mut Walk<'a>, i: usize, floor: usize) {
        if i == w.lengths.len() {
            let covered = w
                .occupied
                .iter()
                .all(|o| w.chosen.iter().any(|s| s.contains(o)));
            if covered {
                w.total += 1;
                for s in &w.chosen {
                    for &c in s.iter() {
                        w.hits[c] += 1;
                    }
                }
            }
            return;
        }
        // same-length ships are interchangeable: keep their runs in order
        let start = if i > 0 && w.lengths[i] == w.lengths[i - 1] { floor + 1 } else { 0 };
        let per_ship = w.per_ship;
        for k in start..per_ship[i].len() {
            let run: &'a [usize] = &per_ship[i][k];
            let width = w.width;
            let free = w
                .chosen
                .iter()
                .all(|s| s.iter().all(|&a| run.iter().all(|&b| !touching(a, b, width))));
            if free {
                w.chosen.push(run);
                place(w, i + 1, k);
                w.chosen.pop();
            }
        }
    }

    let mut walk = Walk {
        lengths: &lengths,
        per_ship: &per_ship,
        occupied: &occupied,
        width,
        chosen: Vec::new(),
        hits: vec![0; grid.len()],
        total: 0,
    };
    place(&mut walk, 0, 0);
    if walk.total == 0 {
        return None;
    }
    let total = walk.total as f64;
    Some(walk.hits.iter().map(|&h| h as f64 / total).collect())
}

pub fn assert_close(actual: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "cell {i}: got {a}, expected {e}"
        );
    }
}
