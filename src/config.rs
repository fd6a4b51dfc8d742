// src/config.rs

//! Generation settings. Everything here is caller-supplied and validated once, at the
//! start of a generation pass, before any grid or scene mutation happens.

use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};
use crate::utils::util::{is_float_round, ROUND_EPSILON};
use crate::utils::Vector3;

/// Side length of the fixed reflection probe lattice.
pub const PROBE_GRID_SIZE: usize = 5;
/// World-space distance between two neighbouring probes.
pub const PROBE_SPACING: f32 = 5.0;
/// Edge length of each probe's capture box.
pub const PROBE_BOX_SIZE: f32 = 2.1;
/// Thickness of a wall cube along its local `x` axis.
pub const WALL_THICKNESS: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Spot,
    Directional,
    Point,
    Rectangle,
    Disc,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// Properties copied onto every light the generator places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    /// Point or rectangle lights read best inside corridors.
    pub kind: LightKind,
    pub intensity: f32,
    pub range: f32,
    pub color: Color,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            kind: LightKind::Rectangle,
            intensity: 3.0,
            range: 5.0,
            color: Color::WHITE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionProbeSettings {
    pub enabled: bool,
    pub resolution: u32,
    pub box_projection: bool,
}

impl Default for ReflectionProbeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            resolution: 1024,
            box_projection: true,
        }
    }
}

/// A prefab-like object the host knows how to instantiate. The generator only keeps
/// its name and base scale; the vertical component is replaced by the maze height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureTemplate {
    pub name: String,
    #[serde(default = "unit_scale")]
    pub base_scale: Vector3,
}

fn unit_scale() -> Vector3 {
    Vector3::ONE
}

impl StructureTemplate {
    pub fn new(name: impl Into<String>, base_scale: Vector3) -> Self {
        Self {
            name: name.into(),
            base_scale,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeConfig {
    /// Cells along `x`.
    pub width: usize,
    /// Cells along `z`.
    pub depth: usize,
    /// Vertical extent of walls, structures and the gap between ground and roof.
    pub height: f32,
    /// World-space edge length of one cell.
    pub wall_length: f32,
    /// Chance (0-100) for a wall cell to become a wall.
    pub wall_spawn_percentage: u32,
    /// Chance (0-100) for a wall cell to become a structure instead.
    pub structure_spawn_percentage: u32,
    pub structure_templates: Vec<StructureTemplate>,
    pub light: LightSettings,
    pub reflection_probes: ReflectionProbeSettings,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: 15,
            depth: 15,
            height: 3.0,
            wall_length: 2.0,
            wall_spawn_percentage: 70,
            structure_spawn_percentage: 30,
            structure_templates: vec![StructureTemplate::new("Pillar", Vector3::ONE)],
            light: LightSettings::default(),
            reflection_probes: ReflectionProbeSettings::default(),
        }
    }
}

impl MazeConfig {
    /// Parses a (possibly partial) JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks every constraint on the settings. A non-integral wall length is only
    /// worth a warning.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.depth == 0 {
            return Err(MazeError::invalid_config(format!(
                "maze dimensions must be positive, got {}x{}",
                self.width, self.depth
            )));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(MazeError::invalid_config(format!(
                "height must be positive, got {}",
                self.height
            )));
        }
        if !(self.wall_length.is_finite() && self.wall_length > 0.0) {
            return Err(MazeError::invalid_config(format!(
                "wall length must be positive, got {}",
                self.wall_length
            )));
        }
        if self.wall_spawn_percentage > 100 || self.structure_spawn_percentage > 100 {
            return Err(MazeError::invalid_config(format!(
                "spawn percentages must be within 0..=100, got wall={} structure={}",
                self.wall_spawn_percentage, self.structure_spawn_percentage
            )));
        }
        let total = self.wall_spawn_percentage + self.structure_spawn_percentage;
        if total > 100 {
            return Err(MazeError::invalid_config(format!(
                "wall and structure percentages add up to {}, which exceeds 100",
                total
            )));
        }
        if self.structure_spawn_percentage > 0 && self.structure_templates.is_empty() {
            return Err(MazeError::invalid_config(
                "structure spawn percentage is set but no structure templates are configured",
            ));
        }
        if self.reflection_probes.enabled && self.reflection_probes.resolution == 0 {
            return Err(MazeError::invalid_config(
                "reflection probe resolution must be positive",
            ));
        }

        if !is_float_round(self.wall_length, ROUND_EPSILON) {
            warn!(
                "Wall length {} is not a whole number; round it to keep walls aligned with the grid",
                self.wall_length
            );
        }
        Ok(())
    }
}
