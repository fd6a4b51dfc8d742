// src/editor/generator.rs

use futures::executor::block_on;
use log::{debug, info};
use rand::Rng;
use serde::Serialize;

use crate::config::MazeConfig;
use crate::error::Result;
use crate::layout::{LayoutPlanner, PlanCounts};
use crate::map::{CarveStep, Grid, MazeCarver, MazeStats};
use crate::scene::{GeneratedHandleSet, ObjectHandle, SceneBuilder, SceneHost};
use crate::schedule::{checkpoint, CancellationToken, Immediate, Scheduler};

/// Summary of one finished generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub width: usize,
    pub depth: usize,
    pub maze: MazeStats,
    pub instructions: PlanCounts,
    pub generated_objects: usize,
}

/// Owns the configuration, the scene host and the handles of the maze currently in
/// the scene. Generation takes `&mut self`, so two passes over the same generator can
/// never overlap.
pub struct MazeGenerator<H: SceneHost> {
    config: MazeConfig,
    host: H,
    parent: Option<ObjectHandle>,
    builder: SceneBuilder,
    grid: Option<Grid>,
}

impl<H: SceneHost> MazeGenerator<H> {
    pub fn new(config: MazeConfig, host: H) -> Self {
        Self {
            config,
            host,
            parent: None,
            builder: SceneBuilder::new(),
            grid: None,
        }
    }

    /// Generated mazes are created below `parent` instead of at the scene root.
    pub fn with_parent(mut self, parent: ObjectHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn config(&self) -> &MazeConfig {
        &self.config
    }

    /// Replaces the configuration used by the next pass.
    pub fn set_config(&mut self, config: MazeConfig) {
        self.config = config;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// The grid carved by the last pass that got past carving.
    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn handles(&self) -> &GeneratedHandleSet {
        self.builder.handles()
    }

    /// Runs carve, plan and build, suspending through `scheduler` at every yield point.
    ///
    /// The configuration is validated before anything is touched. A previously
    /// generated maze is then cleared. Cancellation or a host error leaves the scene
    /// partially built; call [`MazeGenerator::clear`] to reset it.
    pub async fn generate<R: Rng + ?Sized, S: Scheduler>(
        &mut self,
        rng: &mut R,
        scheduler: &S,
        cancel: &CancellationToken,
    ) -> Result<GenerationReport> {
        self.config.validate()?;
        self.clear()?;

        let (width, depth) = (self.config.width, self.config.depth);
        info!("Generating {}x{} maze", width, depth);

        let mut grid = Grid::new(width, depth);
        checkpoint(scheduler, cancel).await?;

        let mut carver = MazeCarver::new(&mut grid)?;
        loop {
            match carver.step(&mut grid, rng)? {
                CarveStep::Advanced { .. } => {}
                CarveStep::Backtracked { .. } => checkpoint(scheduler, cancel).await?,
                CarveStep::Finished => break,
            }
        }
        let maze = MazeStats::of(&grid);
        debug!(
            "Carving finished: {} passages, {} open cells, {} walls",
            carver.passages(),
            maze.open_cells,
            maze.wall_cells
        );

        let plan = LayoutPlanner::new(&self.config).plan(&grid, rng)?;
        let instructions = plan.counts();
        self.grid = Some(grid);

        self.builder
            .build(
                &mut self.host,
                self.parent,
                plan,
                &self.config.structure_templates,
                scheduler,
                cancel,
            )
            .await?;

        let report = GenerationReport {
            width,
            depth,
            maze,
            instructions,
            generated_objects: self.builder.handles().len(),
        };
        info!(
            "Maze ready: {} objects ({} walls, {} structures, {} lights)",
            report.generated_objects,
            instructions.walls,
            instructions.structures,
            instructions.lights
        );
        Ok(report)
    }

    /// Runs a whole pass on the current thread without ever suspending.
    pub fn generate_blocking<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<GenerationReport> {
        block_on(self.generate(rng, &Immediate, &CancellationToken::new()))
    }

    /// Removes the generated maze from the scene. Safe to call repeatedly.
    pub fn clear(&mut self) -> Result<()> {
        self.builder.clear(&mut self.host)
    }

    pub fn set_static(&mut self, is_static: bool) -> Result<()> {
        self.builder.set_static(&mut self.host, is_static)
    }

    pub fn set_visible(&mut self, visible: bool) -> Result<usize> {
        self.builder.set_visible(&mut self.host, visible)
    }
}
