mod common;

use battleship_solver::{
    generate_placements, recompute, recompute_with, EngineConfig, EngineError, Grid,
    Inconsistency, Precision, ProbabilityMap, ProbeOutcome,
};
use common::{assert_close, brute_force, grid_from};

const EPS: f64 = 1e-9;

fn assert_matches_brute_force(grid: &Grid) {
    let map = recompute(grid).unwrap();
    assert!(map.is_exact(), "{:?}", map);
    let expected = brute_force(grid).expect("position has a completion");
    assert_close(map.values(), &expected, EPS);
}

#[test]
fn sum_equals_remaining_segments() {
    let grid = Grid::new(5, 5, &[3, 2, 2]).unwrap();
    let map = recompute(&grid).unwrap();
    assert!((map.sum() - 7.0).abs() < EPS);
    assert_eq!(map.dimensions(), (5, 5));
}

#[test]
fn recompute_is_idempotent() {
    let grid = grid_from(&[".....", ".o...", "...x.", ".....", "..o.."], &[3, 2]);
    let first = recompute(&grid).unwrap();
    let second = recompute(&grid).unwrap();
    assert_eq!(first, second);
}

#[test]
fn square_grid_map_is_symmetric() {
    let grid = Grid::new(4, 4, &[2, 2]).unwrap();
    let map = recompute(&grid).unwrap();
    let n = 3;
    let at = |r: usize, c: usize| map.get(r, c).unwrap();
    for r in 0..4 {
        for c in 0..4 {
            let v = at(r, c);
            for (rr, cc) in [
                (c, r),
                (n - r, c),
                (r, n - c),
                (n - r, n - c),
                (c, n - r),
                (n - c, r),
                (n - c, n - r),
            ] {
                assert!((v - at(rr, cc)).abs() < EPS, "({r},{c}) vs ({rr},{cc})");
            }
        }
    }
}

#[test]
fn single_fit_is_certain() {
    let grid = Grid::new(3, 1, &[3]).unwrap();
    let map = recompute(&grid).unwrap();
    assert_close(map.values(), &[1.0, 1.0, 1.0], EPS);
}

#[test]
fn occupied_cells_read_one() {
    let grid = grid_from(&[".....", ".....", "..x..", ".....", "....."], &[3]);
    let map = recompute(&grid).unwrap();
    assert!((map.get(2, 2).unwrap() - 1.0).abs() < EPS);
    // diagonal neighbours of a hit can never hold the same ship
    assert!(map.get(1, 1).unwrap().abs() < EPS);
    assert!((map.sum() - 3.0).abs() < EPS);
}

#[test]
fn uncovered_cells_are_zero() {
    let grid = grid_from(&["..o..", "o.o.o", "..o..", "ooooo", "....."], &[3, 2]);
    let map = recompute(&grid).unwrap();
    let mut covered = vec![false; grid.len()];
    for &len in grid.remaining_ship_lengths() {
        for p in generate_placements(&grid, len) {
            for i in p.cells().iter_set_bits() {
                covered[i] = true;
            }
        }
    }
    for (i, &v) in map.values().iter().enumerate() {
        if !covered[i] {
            assert_eq!(v, 0.0, "cell {i}");
        }
    }
}

#[test]
fn matches_enumeration_on_empty_grids() {
    assert_matches_brute_force(&Grid::new(5, 5, &[3, 2, 2]).unwrap());
    assert_matches_brute_force(&Grid::new(4, 4, &[2, 1, 1]).unwrap());
    assert_matches_brute_force(&Grid::new(6, 3, &[3, 2]).unwrap());
}

#[test]
fn matches_enumeration_with_hits() {
    assert_matches_brute_force(&grid_from(
        &[".....", ".o...", "...x.", ".....", "..o.."],
        &[3, 2, 2],
    ));
    assert_matches_brute_force(&grid_from(
        &["......", ".x....", "o.o...", "....x.", "...o..", "x....."],
        &[3, 3, 2],
    ));
    assert_matches_brute_force(&grid_from(
        &["x.o...", "......", "......", "o.....", "....o.", "x....."],
        &[2, 2, 1],
    ));
}

#[test]
fn matches_enumeration_around_resolved_ship() {
    let mut grid = Grid::new(6, 6, &[3, 2, 2]).unwrap();
    grid.apply_result((1, 1), ProbeOutcome::Occupied).unwrap();
    grid.apply_result((1, 2), ProbeOutcome::ShipResolved(2)).unwrap();
    grid.apply_result((4, 4), ProbeOutcome::Occupied).unwrap();
    grid.apply_result((0, 5), ProbeOutcome::Miss).unwrap();
    assert_matches_brute_force(&grid);
}

#[test]
fn matches_enumeration_with_four_other_ships() {
    assert_matches_brute_force(&Grid::new(6, 6, &[3, 2, 2, 2, 1]).unwrap());
    assert_matches_brute_force(&grid_from(
        &["......", ".x....", "......", "....o.", "....x.", "......"],
        &[3, 2, 2, 1, 1],
    ));
}

#[test]
fn matches_enumeration_with_three_other_ships() {
    assert_matches_brute_force(&grid_from(
        &["......", "..o...", "......", "...x..", "......", "o....."],
        &[3, 2, 2, 1],
    ));
    assert_matches_brute_force(&Grid::new(5, 5, &[2, 2, 2, 1]).unwrap());
}

#[test]
fn group_expansion_matches_when_truncation_is_loose() {
    let grid = grid_from(
        &["x.o...", "......", "......", "o.....", "....o.", "x....."],
        &[2, 2, 1],
    );
    let exact = recompute(&grid).unwrap();
    let config = EngineConfig::default()
        .with_max_exact_groups(0)
        .with_group_order(2);
    let truncated = recompute_with(&grid, &config).unwrap();
    assert!(!truncated.is_exact());
    // two groups: every subset is still enumerated
    assert_close(truncated.values(), exact.values(), EPS);
}

#[test]
fn approximate_maps_are_flagged_and_normalised() {
    let grid = Grid::new(8, 8, &[4, 3, 3, 2, 2, 1]).unwrap();
    let config = EngineConfig::default().with_max_exact_ships(2);
    let map = recompute_with(&grid, &config).unwrap();
    match map.precision() {
        Precision::Approximate(t) => {
            assert!(t.pairs_estimated);
            assert_eq!(t.group_order, None);
            assert_eq!(t.clamped_cells, 0);
        }
        Precision::Exact => panic!("expected an approximate map"),
    }
    assert!((map.sum() - 15.0).abs() < 1e-6);
    assert!(map.values().iter().all(|&v| v > 0.0));
}

#[test]
fn estimate_without_pairs_agrees_with_exact() {
    let grid = grid_from(&[".....", ".o...", "...x.", ".....", "....."], &[3, 2]);
    let exact = recompute(&grid).unwrap();
    let estimated = recompute_with(&grid, &EngineConfig::default().with_max_exact_ships(0)).unwrap();
    assert!(!estimated.is_exact());
    assert_close(estimated.values(), exact.values(), 1e-9);
}

#[test]
fn default_fleet_estimate_stays_usable() {
    let mut grid = Grid::new(10, 10, &battleship_solver::EXTENDED_FLEET).unwrap();
    grid.apply_result((4, 4), ProbeOutcome::Occupied).unwrap();
    grid.apply_result((0, 0), ProbeOutcome::Miss).unwrap();
    let map = recompute(&grid).unwrap();
    assert!(!map.is_exact());
    assert!((map.sum() - 31.0).abs() < 1e-6);
    assert!(map.get(4, 4).unwrap() > 0.0);
    assert_eq!(map.get(0, 0), Some(0.0));
}

#[test]
fn workers_do_not_change_the_map() {
    let grid = grid_from(
        &["......", ".x....", "o.o...", "....x.", "...o..", "x....."],
        &[3, 3, 2],
    );
    let sequential = recompute(&grid).unwrap();
    let parallel = recompute_with(&grid, &EngineConfig::default().with_workers(4)).unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn workers_do_not_change_a_five_ship_map() {
    let grid = grid_from(
        &["......", ".x....", "......", "....o.", "....x.", "......"],
        &[3, 2, 2, 1, 1],
    );
    let sequential = recompute(&grid).unwrap();
    for workers in [2, 3, 8] {
        let parallel = recompute_with(&grid, &EngineConfig::default().with_workers(workers)).unwrap();
        assert_eq!(sequential, parallel, "workers={}", workers);
    }
}

#[test]
fn finished_grid_maps_to_zero() {
    let grid = grid_from(&["#o.", "oo.", "..."], &[]);
    let map = recompute(&grid).unwrap();
    assert_eq!(map, ProbabilityMap::zeros(3, 3));
}

#[test]
fn inconsistent_positions_are_reported() {
    let unplaceable = grid_from(&[".o."], &[3]);
    assert_eq!(
        recompute(&unplaceable).unwrap_err(),
        EngineError::InconsistentState(Inconsistency::Unplaceable(3))
    );

    let crowded = Grid::new(4, 1, &[2, 2]).unwrap();
    assert_eq!(
        recompute(&crowded).unwrap_err(),
        EngineError::InconsistentState(Inconsistency::NoCompletion)
    );

    let stray_hit = grid_from(&["x..", "...", "..#"], &[]);
    assert_eq!(
        recompute(&stray_hit).unwrap_err(),
        EngineError::InconsistentState(Inconsistency::NoCompletion)
    );

    // two hits too far apart for the only ship
    let split = grid_from(&["x...x"], &[2]);
    assert_eq!(
        recompute(&split).unwrap_err(),
        EngineError::InconsistentState(Inconsistency::NoCompletion)
    );
}

#[test]
fn map_serializes_to_json() {
    let grid = Grid::new(3, 3, &[2]).unwrap();
    let map = recompute(&grid).unwrap();
    let text = serde_json::to_string(&map).unwrap();
    let back: ProbabilityMap = serde_json::from_str(&text).unwrap();
    assert_eq!(back.dimensions(), map.dimensions());
    assert_close(back.values(), map.values(), 1e-12);
}

#[test]
fn wider_exact_limits_agree_with_defaults() {
    let grid = Grid::new(5, 5, &[3, 2, 2]).unwrap();
    let config = EngineConfig::exact();
    assert!(config.max_exact_ships >= EngineConfig::default().max_exact_ships);
    let wide = recompute_with(&grid, &config).unwrap();
    assert!(wide.is_exact());
    assert_close(wide.values(), recompute(&grid).unwrap().values(), EPS);
}

#[test]
fn argmax_finds_the_likeliest_cell() {
    // the middle of a 1x5 strip is covered by every placement of a 3
    let grid = Grid::new(5, 1, &[3]).unwrap();
    let map = recompute(&grid).unwrap();
    assert_eq!(map.argmax(), Some((0, 2)));
    assert!((map.get(0, 2).unwrap() - 1.0).abs() < EPS);
    assert_eq!(map.get(1, 0), None);
    assert_eq!(map.rows().count(), 1);
}
