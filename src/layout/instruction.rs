// src/layout/instruction.rs

use serde::Serialize;

use crate::config::LightSettings;
use crate::utils::{Rotation, Vector3};

/// Built-in geometry every scene host is expected to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimitiveShape {
    /// Unit cube.
    Cube,
    /// 10x10 plane facing `+y`.
    Plane,
}

/// Which material slot a primitive belongs to. Hosts map these onto their own
/// materials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Surface {
    Wall,
    Ground,
    Roof,
}

/// One object to create, decoupled from the act of creating it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum PlacementInstruction {
    /// Interior wall standing on a `Wall` cell of the grid.
    Wall {
        cell: (usize, usize),
        position: Vector3,
        rotation: Rotation,
        scale: Vector3,
    },
    /// Segment of the ring around the maze footprint.
    OuterWall {
        position: Vector3,
        rotation: Rotation,
        scale: Vector3,
    },
    GroundPlane {
        position: Vector3,
        scale: Vector3,
        /// Texture repetitions along `x` and `z`.
        tiling: (usize, usize),
    },
    RoofPlane {
        position: Vector3,
        rotation: Rotation,
        scale: Vector3,
        tiling: (usize, usize),
    },
    Structure {
        cell: (usize, usize),
        template_index: usize,
        position: Vector3,
        rotation: Rotation,
        scale: Vector3,
    },
    Light {
        position: Vector3,
        settings: LightSettings,
    },
    ReflectionProbe {
        position: Vector3,
        size: Vector3,
        resolution: u32,
        box_projection: bool,
    },
}

impl PlacementInstruction {
    pub fn name(&self) -> &'static str {
        match self {
            PlacementInstruction::Wall { .. } => "Wall",
            PlacementInstruction::OuterWall { .. } => "Outer Wall",
            PlacementInstruction::GroundPlane { .. } => "Ground",
            PlacementInstruction::RoofPlane { .. } => "Roof",
            PlacementInstruction::Structure { .. } => "Structure",
            PlacementInstruction::Light { .. } => "Light",
            PlacementInstruction::ReflectionProbe { .. } => "ReflectionProbe",
        }
    }
}

/// Number of instructions of each kind in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlanCounts {
    pub walls: usize,
    pub outer_walls: usize,
    pub ground_planes: usize,
    pub roof_planes: usize,
    pub structures: usize,
    pub lights: usize,
    pub reflection_probes: usize,
}

impl PlanCounts {
    pub fn record(&mut self, instruction: &PlacementInstruction) {
        match instruction {
            PlacementInstruction::Wall { .. } => self.walls += 1,
            PlacementInstruction::OuterWall { .. } => self.outer_walls += 1,
            PlacementInstruction::GroundPlane { .. } => self.ground_planes += 1,
            PlacementInstruction::RoofPlane { .. } => self.roof_planes += 1,
            PlacementInstruction::Structure { .. } => self.structures += 1,
            PlacementInstruction::Light { .. } => self.lights += 1,
            PlacementInstruction::ReflectionProbe { .. } => self.reflection_probes += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.walls
            + self.outer_walls
            + self.ground_planes
            + self.roof_planes
            + self.structures
            + self.lights
            + self.reflection_probes
    }
}
