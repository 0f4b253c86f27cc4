mod common;

use battleship_solver::{
    focus_cells, sample_move, select_focused_move, select_move, select_move_with, CellStatus,
    CentreDistance, DiagonalUnknowns, EngineError, Grid, ProbabilityMap, UnknownNeighbours,
};
use common::grid_from;
use rand::{rngs::SmallRng, SeedableRng};

fn uniform(width: usize, height: usize) -> ProbabilityMap {
    ProbabilityMap::from_values(width, height, vec![0.5; width * height]).unwrap()
}

#[test]
fn picks_the_highest_unknown_cell() {
    let grid = grid_from(&["x..", "...", "..."], &[2]);
    let mut values = vec![0.1; 9];
    values[0] = 1.0;
    values[5] = 0.7;
    let map = ProbabilityMap::from_values(3, 3, values).unwrap();
    let mut rng = SmallRng::seed_from_u64(1);
    // the occupied corner is never a candidate
    assert_eq!(select_move(&map, &grid, &mut rng).unwrap(), (1, 2));
}

#[test]
fn near_equal_values_count_as_tied() {
    let grid = Grid::new(3, 3, &[2]).unwrap();
    let mut values = vec![0.5; 9];
    values[0] = 0.5 + 1e-12;
    let map = ProbabilityMap::from_values(3, 3, values).unwrap();
    let mut rng = SmallRng::seed_from_u64(3);
    // the centre wins the tie on unknown neighbours
    assert_eq!(select_move(&map, &grid, &mut rng).unwrap(), (1, 1));
}

#[test]
fn tie_break_policies() {
    let grid = Grid::new(3, 3, &[2]).unwrap();
    let map = uniform(3, 3);
    let mut rng = SmallRng::seed_from_u64(7);
    assert_eq!(select_move_with(&map, &grid, &UnknownNeighbours, &mut rng).unwrap(), (1, 1));
    assert_eq!(select_move_with(&map, &grid, &DiagonalUnknowns, &mut rng).unwrap(), (1, 1));
    assert_eq!(select_move_with(&map, &grid, &CentreDistance, &mut rng).unwrap(), (1, 1));

    // with the centre gone the edge midpoints keep two unknown diagonals
    let holed = grid_from(&["...", ".o.", "..."], &[2]);
    for seed in 0..16 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let cell = select_move_with(&map, &holed, &DiagonalUnknowns, &mut rng).unwrap();
        assert!([(0, 1), (1, 0), (1, 2), (2, 1)].contains(&cell), "{:?}", cell);
    }
}

#[test]
fn remaining_ties_follow_the_rng() {
    let grid = Grid::new(4, 4, &[2]).unwrap();
    let map = uniform(4, 4);
    let pick = |seed| {
        let mut rng = SmallRng::seed_from_u64(seed);
        select_move(&map, &grid, &mut rng).unwrap()
    };
    // the four inner cells share the best neighbour count
    let inner = [(1, 1), (1, 2), (2, 1), (2, 2)];
    for seed in 0..32 {
        assert_eq!(pick(seed), pick(seed));
        assert!(inner.contains(&pick(seed)));
    }
    let distinct: std::collections::BTreeSet<_> = (0..64).map(pick).collect();
    assert!(distinct.len() > 1);
}

#[test]
fn no_candidate_and_dimension_errors() {
    let mut grid = Grid::new(2, 1, &[1]).unwrap();
    grid.set_status((0, 0), CellStatus::Miss).unwrap();
    grid.set_status((0, 1), CellStatus::Resolved).unwrap();
    let map = uniform(2, 1);
    let mut rng = SmallRng::seed_from_u64(0);
    assert_eq!(select_move(&map, &grid, &mut rng), Err(EngineError::NoCandidate));
    assert_eq!(sample_move(&map, &grid, 1.0, &mut rng), Err(EngineError::NoCandidate));

    let other = Grid::new(3, 3, &[2]).unwrap();
    assert_eq!(
        select_move(&map, &other, &mut rng),
        Err(EngineError::DimensionMismatch { map: (2, 1), grid: (3, 3) })
    );
}

#[test]
fn sampling_prefers_likely_cells() {
    let grid = Grid::new(3, 1, &[1]).unwrap();
    let map = ProbabilityMap::from_values(3, 1, vec![0.0, 0.9, 0.1]).unwrap();
    let mut rng = SmallRng::seed_from_u64(11);
    for _ in 0..32 {
        let cell = sample_move(&map, &grid, 0.05, &mut rng).unwrap();
        assert_ne!(cell, (0, 0));
    }

    let flat = ProbabilityMap::zeros(3, 1);
    let mut rng = SmallRng::seed_from_u64(12);
    let cell = sample_move(&flat, &grid, 1.0, &mut rng).unwrap();
    assert!(cell.0 == 0 && cell.1 < 3);
}

#[test]
fn cold_sampling_stays_greedy_on_large_values() {
    let grid = Grid::new(3, 1, &[1]).unwrap();
    let map = ProbabilityMap::from_values(3, 1, vec![1.4, 2.5, 0.2]).unwrap();
    let mut rng = SmallRng::seed_from_u64(21);
    for _ in 0..50 {
        assert_eq!(sample_move(&map, &grid, 1e-4, &mut rng), Ok((0, 1)));
    }
}

#[test]
fn sampling_rejects_non_positive_temperature() {
    let grid = Grid::new(3, 1, &[1]).unwrap();
    let map = uniform(3, 1);
    let mut rng = SmallRng::seed_from_u64(4);
    for t in [0.0, -1.0, f64::NAN] {
        assert_eq!(sample_move(&map, &grid, t, &mut rng), Err(EngineError::InvalidTemperature));
    }
}

#[test]
fn focus_keeps_cells_the_smallest_ship_can_cover() {
    let grid = grid_from(&["..o.o"], &[2]);
    let focus: Vec<usize> = focus_cells(&grid).iter_set_bits().collect();
    assert_eq!(focus, vec![0, 1]);

    let map = ProbabilityMap::from_values(5, 1, vec![0.2, 0.3, 0.0, 0.9, 0.0]).unwrap();
    let mut rng = SmallRng::seed_from_u64(8);
    assert_eq!(select_move(&map, &grid, &mut rng), Ok((0, 3)));
    assert_eq!(select_focused_move(&map, &grid, &UnknownNeighbours, &mut rng), Ok((0, 1)));
}

#[test]
fn focus_adds_neighbours_of_hits() {
    let grid = grid_from(&["...", ".x.", "..."], &[3, 1]);
    let focus: Vec<usize> = focus_cells(&grid).iter_set_bits().collect();
    assert_eq!(focus, vec![1, 3, 5, 7]);

    let mut values = vec![0.25; 9];
    values[0] = 0.9;
    values[4] = 1.0;
    let map = ProbabilityMap::from_values(3, 3, values).unwrap();
    let mut rng = SmallRng::seed_from_u64(2);
    for _ in 0..10 {
        let cell = select_focused_move(&map, &grid, &UnknownNeighbours, &mut rng).unwrap();
        assert!([(0, 1), (1, 0), (1, 2), (2, 1)].contains(&cell), "{:?}", cell);
    }
}

#[test]
fn empty_focus_falls_back_to_every_unknown_cell() {
    let grid = grid_from(&["#o.", "oo.", "..."], &[]);
    assert!(focus_cells(&grid).is_empty());
    let mut values = vec![0.0; 9];
    values[8] = 0.4;
    let map = ProbabilityMap::from_values(3, 3, values).unwrap();
    let mut rng = SmallRng::seed_from_u64(5);
    assert_eq!(select_focused_move(&map, &grid, &UnknownNeighbours, &mut rng), Ok((2, 2)));
}
