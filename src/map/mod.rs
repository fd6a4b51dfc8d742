// src/map/mod.rs
pub mod analysis;
pub mod carver;
pub mod grid;

pub use analysis::MazeStats;
pub use carver::{CarveStep, MazeCarver};
pub use grid::{CellState, Grid, VisitedSet};
