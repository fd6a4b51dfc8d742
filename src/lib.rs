// src/lib.rs

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod layout;
pub mod map;
pub mod scene;
pub mod schedule;
pub mod utils;

pub use config::MazeConfig;
pub use editor::{GenerationReport, MazeGenerator};
pub use error::{MazeError, Result};
