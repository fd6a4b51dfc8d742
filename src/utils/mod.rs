// src/utils/mod.rs
pub mod geometry;
pub mod util;

pub use geometry::{Rotation, Vector3};
