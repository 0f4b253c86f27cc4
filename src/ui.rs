#![cfg(feature = "std")]

use crate::{common::CellStatus, grid::Grid, probability::ProbabilityMap};

/// Column label: `A`, `B`, ... then `a`, `b`, ... past `Z`.
fn column_label(c: usize) -> char {
    match c {
        0..=25 => (b'A' + c as u8) as char,
        26..=51 => (b'a' + (c - 26) as u8) as char,
        _ => '?',
    }
}

/// Print the grid with each unknown cell showing its probability in percent.
pub fn print_probability_map(map: &ProbabilityMap, grid: &Grid) {
    std::print!("   ");
    for c in 0..grid.width() {
        std::print!(" {:>4}", column_label(c));
    }
    std::println!();
    for r in 0..grid.height() {
        std::print!("{:2} ", r + 1);
        for c in 0..grid.width() {
            match grid.get(r, c) {
                Some(CellStatus::Unknown) => {
                    let p = map.get(r, c).unwrap_or(0.0) * 100.0;
                    std::print!(" {:>3.0}%", p);
                }
                Some(CellStatus::Miss) => std::print!("    ."),
                Some(CellStatus::Occupied) => std::print!("    X"),
                Some(CellStatus::Resolved) => std::print!("    #"),
                None => {}
            }
        }
        std::println!();
    }
    if !map.is_exact() {
        std::println!("(approximate: {:?})", map.precision());
    }
}

/// Format a cell as `B7` style coordinates.
pub fn cell_label((row, col): (usize, usize)) -> String {
    format!("{}{}", column_label(col), row + 1)
}
