#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use battleship_solver::{
    cell_label, init_logging, print_probability_map, recompute_with, Cell, EngineConfig, GameStatus,
    Grid, ProbeOutcome, Solver, EXTENDED_FLEET,
};

#[cfg(feature = "std")]
use clap::{Parser, Subcommand};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use serde_json::json;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    /// Largest number of other ships counted exactly.
    #[arg(long, global = true, default_value_t = EngineConfig::default().max_exact_ships)]
    exact_ships: usize,
    /// Largest number of occupied groups expanded exactly.
    #[arg(long, global = true, default_value_t = EngineConfig::default().max_exact_groups)]
    exact_groups: usize,
    /// Threads sharing the placement loop.
    #[arg(long, global = true, default_value_t = 1)]
    workers: usize,
    /// Print machine-readable JSON instead of a board.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[cfg(feature = "std")]
enum Commands {
    /// Show the occupancy map of an empty grid.
    Map {
        #[arg(long, default_value_t = 10)]
        width: usize,
        #[arg(long, default_value_t = 10)]
        height: usize,
        #[arg(long, value_delimiter = ',', default_values_t = vec![5, 4, 3, 3, 2])]
        ships: Vec<usize>,
    },
    /// Play one of the built-in hidden layouts to the end.
    Replay {
        #[arg(long, default_value_t = 0)]
        layout: usize,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        /// Only probe cells the smallest ship can cover or next to hits.
        #[arg(long)]
        focused: bool,
    },
}

/// Hidden 10×10 layouts for the extended fleet, one list of cells per ship.
#[cfg(feature = "std")]
const LAYOUTS: [[&[Cell]; 10]; 3] = [
    [
        &[(4, 9), (5, 9), (6, 9), (7, 9), (8, 9), (9, 9)],
        &[(0, 0), (1, 0), (2, 0), (3, 0)],
        &[(6, 1), (7, 1), (8, 1), (9, 1)],
        &[(1, 6), (1, 7), (1, 8)],
        &[(3, 7), (4, 7), (5, 7)],
        &[(7, 7), (8, 7), (9, 7)],
        &[(0, 3), (0, 4)],
        &[(2, 2), (3, 2)],
        &[(7, 3), (7, 4)],
        &[(9, 4), (9, 5)],
    ],
    [
        &[(9, 0), (9, 1), (9, 2), (9, 3), (9, 4), (9, 5)],
        &[(0, 6), (0, 7), (0, 8), (0, 9)],
        &[(6, 9), (7, 9), (8, 9), (9, 9)],
        &[(1, 0), (2, 0), (3, 0)],
        &[(2, 9), (3, 9), (4, 9)],
        &[(5, 0), (6, 0), (7, 0)],
        &[(0, 2), (1, 2)],
        &[(0, 4), (1, 4)],
        &[(2, 7), (3, 7)],
        &[(8, 7), (9, 7)],
    ],
    [
        &[(4, 2), (4, 3), (4, 4), (4, 5), (4, 6), (4, 7)],
        &[(0, 4), (0, 5), (0, 6), (0, 7)],
        &[(2, 4), (2, 5), (2, 6), (2, 7)],
        &[(0, 2), (1, 2), (2, 2)],
        &[(6, 2), (6, 3), (6, 4)],
        &[(6, 6), (6, 7), (6, 8)],
        &[(5, 0), (6, 0)],
        &[(8, 0), (8, 1)],
        &[(8, 3), (8, 4)],
        &[(8, 6), (8, 7)],
    ],
];

/// Answer a probe against a hidden layout, consuming hit cells.
#[cfg(feature = "std")]
fn answer(hidden: &mut [(usize, Vec<Cell>)], cell: Cell) -> ProbeOutcome {
    for (len, afloat) in hidden.iter_mut() {
        if let Some(pos) = afloat.iter().position(|&c| c == cell) {
            afloat.remove(pos);
            return if afloat.is_empty() {
                ProbeOutcome::ShipResolved(*len)
            } else {
                ProbeOutcome::Occupied
            };
        }
    }
    ProbeOutcome::Miss
}

#[cfg(feature = "std")]
fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = EngineConfig::default()
        .with_max_exact_ships(cli.exact_ships)
        .with_max_exact_groups(cli.exact_groups)
        .with_workers(cli.workers);

    match cli.command {
        Commands::Map {
            width,
            height,
            ships,
        } => {
            let grid = Grid::new(width, height, &ships).map_err(|e| anyhow::anyhow!(e))?;
            let map = recompute_with(&grid, &config).map_err(|e| anyhow::anyhow!(e))?;
            if cli.json {
                println!("{}", serde_json::to_string(&map)?);
            } else {
                print_probability_map(&map, &grid);
            }
        }
        Commands::Replay {
            layout,
            seed,
            focused,
        } => {
            let ships = LAYOUTS
                .get(layout)
                .ok_or_else(|| anyhow::anyhow!("layout {} does not exist", layout))?;
            let mut hidden: Vec<(usize, Vec<Cell>)> =
                ships.iter().map(|s| (s.len(), s.to_vec())).collect();
            let grid = Grid::new(10, 10, &EXTENDED_FLEET).map_err(|e| anyhow::anyhow!(e))?;
            let mut solver = Solver::new(grid).with_config(config).with_focus(focused);
            let mut rng = if let Some(s) = seed {
                SmallRng::seed_from_u64(s)
            } else {
                let mut seed_rng = rand::rng();
                SmallRng::from_rng(&mut seed_rng)
            };

            while solver.status() == GameStatus::Active {
                let (cell, map) = solver.next_move(&mut rng).map_err(|e| anyhow::anyhow!(e))?;
                if !cli.json {
                    print_probability_map(&map, solver.grid());
                }
                let outcome = answer(&mut hidden, cell);
                solver
                    .apply_result(cell, outcome)
                    .map_err(|e| anyhow::anyhow!(e))?;
                log::info!(
                    "shot {} at {}: {:?} (p={:.3})",
                    solver.shots(),
                    cell_label(cell),
                    outcome,
                    map.get(cell.0, cell.1).unwrap_or(0.0)
                );
            }

            if cli.json {
                let result = json!({
                    "layout": layout,
                    "seed": seed,
                    "shots": solver.shots(),
                });
                println!("{}", serde_json::to_string(&result)?);
            } else {
                println!("All ships found after {} shots", solver.shots());
            }
        }
    }
    Ok(())
}
