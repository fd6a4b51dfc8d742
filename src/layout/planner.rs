// src/layout/planner.rs

//! Turns a carved grid into placement instructions.
//!
//! Planning has no side effects: given the same grid, configuration and random
//! sequence it always yields the same plan. The plan keeps the grouping the scene
//! builder suspends on (outer wall pairs, obstacle rows, probes), so the builder can
//! yield between groups without re-deriving them.

use log::debug;
use rand::Rng;

use crate::config::{MazeConfig, PROBE_BOX_SIZE, PROBE_GRID_SIZE, PROBE_SPACING, WALL_THICKNESS};
use crate::error::{MazeError, Result};
use crate::layout::instruction::{PlacementInstruction, PlanCounts};
use crate::map::grid::{CellState, Grid};
use crate::utils::util::yaw_from_quarter_turns;
use crate::utils::{Rotation, Vector3};

/// The unit plane primitive is 10x10 world units.
const PLANE_UNIT_SCALE: f32 = 0.1;

/// A complete plan for one maze, in build order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub ground: PlacementInstruction,
    pub roof: PlacementInstruction,
    /// Two segments per step along each edge.
    pub outer_walls: Vec<[PlacementInstruction; 2]>,
    /// One row per `x` column of the grid.
    pub obstacle_rows: Vec<Vec<PlacementInstruction>>,
    /// Empty when reflection probes are disabled.
    pub reflection_probes: Vec<PlacementInstruction>,
}

impl LayoutPlan {
    /// All instructions, flattened in build order.
    pub fn instructions(&self) -> impl Iterator<Item = &PlacementInstruction> {
        std::iter::once(&self.ground)
            .chain(std::iter::once(&self.roof))
            .chain(self.outer_walls.iter().flatten())
            .chain(self.obstacle_rows.iter().flatten())
            .chain(self.reflection_probes.iter())
    }

    pub fn counts(&self) -> PlanCounts {
        let mut counts = PlanCounts::default();
        for instruction in self.instructions() {
            counts.record(instruction);
        }
        counts
    }
}

pub struct LayoutPlanner<'a> {
    config: &'a MazeConfig,
}

impl<'a> LayoutPlanner<'a> {
    pub fn new(config: &'a MazeConfig) -> Self {
        Self { config }
    }

    /// Plans every object for `grid`. The only random draws are made while placing
    /// obstacles, in `x`-major order over the wall cells.
    pub fn plan<R: Rng + ?Sized>(&self, grid: &Grid, rng: &mut R) -> Result<LayoutPlan> {
        let plan = LayoutPlan {
            ground: self.ground_plane(grid),
            roof: self.roof_plane(grid),
            outer_walls: self.outer_walls(grid),
            obstacle_rows: self.obstacles(grid, rng)?,
            reflection_probes: self.reflection_probes(),
        };
        let counts = plan.counts();
        debug!(
            "Planned {} instructions ({} walls, {} structures, {} lights, {} outer walls, {} probes)",
            counts.total(),
            counts.walls,
            counts.structures,
            counts.lights,
            counts.outer_walls,
            counts.reflection_probes
        );
        Ok(plan)
    }

    fn footprint(&self, grid: &Grid) -> (f32, f32) {
        let length = self.config.wall_length;
        (grid.width() as f32 * length, grid.depth() as f32 * length)
    }

    fn plane_position(&self, grid: &Grid, y: f32) -> Vector3 {
        let (width, depth) = self.footprint(grid);
        let half_cell = self.config.wall_length / 2.0;
        Vector3::new(width / 2.0 - half_cell, y, depth / 2.0 - half_cell)
    }

    fn plane_scale(&self, grid: &Grid) -> Vector3 {
        let (width, depth) = self.footprint(grid);
        Vector3::new(width, 1.0, depth) * PLANE_UNIT_SCALE
    }

    pub fn ground_plane(&self, grid: &Grid) -> PlacementInstruction {
        PlacementInstruction::GroundPlane {
            position: self.plane_position(grid, -self.config.height / 2.0),
            scale: self.plane_scale(grid),
            tiling: (grid.width(), grid.depth()),
        }
    }

    /// Same footprint as the ground, flipped to face down.
    pub fn roof_plane(&self, grid: &Grid) -> PlacementInstruction {
        PlacementInstruction::RoofPlane {
            position: self.plane_position(grid, self.config.height / 2.0),
            rotation: Rotation::from_roll(180.0),
            scale: self.plane_scale(grid),
            tiling: (grid.width(), grid.depth()),
        }
    }

    fn wall_scale(&self) -> Vector3 {
        Vector3::new(WALL_THICKNESS, self.config.height, self.config.wall_length)
    }

    fn outer_wall(&self, position: Vector3, yaw: f32) -> PlacementInstruction {
        PlacementInstruction::OuterWall {
            position: position + Vector3::LEFT_BACK,
            rotation: Rotation::from_yaw(yaw),
            scale: self.wall_scale(),
        }
    }

    /// `width + 1` pairs along the `x` edges followed by `depth + 1` pairs along the
    /// `z` edges.
    pub fn outer_walls(&self, grid: &Grid) -> Vec<[PlacementInstruction; 2]> {
        let length = self.config.wall_length;
        let (far_x, far_z) = self.footprint(grid);
        let mut pairs = Vec::with_capacity(grid.width() + grid.depth() + 2);

        for i in 0..=grid.width() {
            let x = i as f32 * length;
            pairs.push([
                self.outer_wall(Vector3::new(x, 0.0, 0.0), 90.0),
                self.outer_wall(Vector3::new(x, 0.0, far_z), 90.0),
            ]);
        }
        for i in 0..=grid.depth() {
            let z = i as f32 * length;
            pairs.push([
                self.outer_wall(Vector3::new(0.0, 0.0, z), 0.0),
                self.outer_wall(Vector3::new(far_x, 0.0, z), 0.0),
            ]);
        }
        pairs
    }

    fn light_at(&self, x: usize, z: usize) -> PlacementInstruction {
        let length = self.config.wall_length;
        PlacementInstruction::Light {
            position: Vector3::new(
                (x as f32 + 0.5) * length,
                self.config.height * 0.5,
                (z as f32 + 0.5) * length,
            ),
            settings: self.config.light.clone(),
        }
    }

    pub fn obstacles<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        rng: &mut R,
    ) -> Result<Vec<Vec<PlacementInstruction>>> {
        let config = self.config;
        let length = config.wall_length;
        let wall_threshold = config.wall_spawn_percentage;
        let structure_threshold = config.wall_spawn_percentage + config.structure_spawn_percentage;
        let mut rows = Vec::with_capacity(grid.width());

        for x in 0..grid.width() {
            let mut row = Vec::new();
            for z in 0..grid.depth() {
                if grid.get(x, z)? != CellState::Wall {
                    continue;
                }
                let position = Vector3::new(x as f32 * length, 0.0, z as f32 * length);
                let roll = rng.random_range(0..100u32);

                if roll < wall_threshold {
                    row.push(PlacementInstruction::Wall {
                        cell: (x, z),
                        position,
                        rotation: yaw_from_quarter_turns(rng.random_range(0..4u32)),
                        scale: self.wall_scale(),
                    });
                    row.push(self.light_at(x, z));
                } else if roll < structure_threshold {
                    let templates = &config.structure_templates;
                    if templates.is_empty() {
                        return Err(MazeError::invalid_config(format!(
                            "cell ({}, {}) rolled a structure but no structure templates are configured",
                            x, z
                        )));
                    }
                    let template_index = rng.random_range(0..templates.len());
                    let base = templates[template_index].base_scale;
                    row.push(PlacementInstruction::Structure {
                        cell: (x, z),
                        template_index,
                        position,
                        rotation: yaw_from_quarter_turns(rng.random_range(0..4u32)),
                        scale: Vector3::new(base.x, config.height, base.z),
                    });
                    row.push(self.light_at(x, z));
                }
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// Fixed lattice of probes, or nothing when probes are disabled.
    pub fn reflection_probes(&self) -> Vec<PlacementInstruction> {
        let settings = &self.config.reflection_probes;
        if !settings.enabled {
            return Vec::new();
        }
        let mut probes = Vec::with_capacity(PROBE_GRID_SIZE * PROBE_GRID_SIZE);
        for i in 0..PROBE_GRID_SIZE {
            for j in 0..PROBE_GRID_SIZE {
                probes.push(PlacementInstruction::ReflectionProbe {
                    position: Vector3::new(
                        i as f32 * PROBE_SPACING,
                        self.config.height / 4.0,
                        j as f32 * PROBE_SPACING,
                    ),
                    size: Vector3::splat(PROBE_BOX_SIZE),
                    resolution: settings.resolution,
                    box_projection: settings.box_projection,
                });
            }
        }
        probes
    }
}
