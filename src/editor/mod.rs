// src/editor/mod.rs

mod generator;

pub use generator::{GenerationReport, MazeGenerator};
