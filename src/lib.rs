#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod bitboard;
mod common;
pub mod compat;
mod config;
pub mod counter;
mod game;
mod grid;
pub mod groups;
#[cfg(feature = "std")]
mod logging;
mod placement;
pub mod prelude;
mod probability;
mod selector;
#[cfg(feature = "std")]
mod ui;

pub use bitboard::{BitBoard, BitBoardError, CellMask, SetBits};
pub use common::*;
pub use config::*;
pub use game::*;
pub use grid::*;
#[cfg(feature = "std")]
pub use logging::init_logging;
pub use placement::*;
pub use probability::*;
pub use selector::*;
#[cfg(feature = "std")]
pub use ui::*;
