// src/layout/mod.rs
pub mod instruction;
pub mod planner;

pub use instruction::{PlacementInstruction, PlanCounts, PrimitiveShape, Surface};
pub use planner::{LayoutPlan, LayoutPlanner};
