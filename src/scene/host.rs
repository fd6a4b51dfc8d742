// src/scene/host.rs

use std::fmt;

use serde::Serialize;

use crate::config::{LightSettings, StructureTemplate};
use crate::error::Result;
use crate::layout::{PrimitiveShape, Surface};
use crate::utils::{Rotation, Vector3};

/// Opaque reference to an object owned by a [`SceneHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectHandle(pub u64);

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Transform {
    pub position: Vector3,
    pub rotation: Rotation,
    pub scale: Vector3,
}

impl Transform {
    pub fn new(position: Vector3, rotation: Rotation, scale: Vector3) -> Self {
        Self { position, rotation, scale }
    }

    pub fn at(position: Vector3) -> Self {
        Self {
            position,
            rotation: Rotation::IDENTITY,
            scale: Vector3::ONE,
        }
    }
}

/// A piece of built-in geometry to create.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSpec {
    pub name: &'static str,
    pub shape: PrimitiveShape,
    pub surface: Surface,
    pub transform: Transform,
    /// Texture repetitions for planes; `None` keeps the material default.
    pub tiling: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSpec {
    pub position: Vector3,
    pub size: Vector3,
    pub resolution: u32,
    pub box_projection: bool,
}

/// The logical groups every generated maze is organised into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneGroup {
    Walls,
    Structures,
    Ground,
    Roof,
    OuterWalls,
    Lights,
    ReflectionProbes,
}

impl SceneGroup {
    /// Name of the object every generated group hangs under.
    pub const ROOT_NAME: &'static str = "Generated Maze";

    pub fn name(&self) -> &'static str {
        match self {
            SceneGroup::Walls => "Walls",
            SceneGroup::Structures => "Structures",
            SceneGroup::Ground => "Ground",
            SceneGroup::Roof => "Roof",
            SceneGroup::OuterWalls => "Outer Walls",
            SceneGroup::Lights => "Lights",
            SceneGroup::ReflectionProbes => "Reflection Probes",
        }
    }

    /// All groups, in the order they are created below the root.
    pub fn all() -> &'static [SceneGroup] {
        &[
            SceneGroup::Walls,
            SceneGroup::Structures,
            SceneGroup::Ground,
            SceneGroup::Roof,
            SceneGroup::OuterWalls,
            SceneGroup::Lights,
            SceneGroup::ReflectionProbes,
        ]
    }
}

/// The engine-side capability the scene builder drives. Implementations own every
/// object they hand out; the generator only keeps handles.
///
/// Any method may refuse with [`crate::error::MazeError::Host`]; the builder
/// propagates that error as-is and does not roll back what it already created.
pub trait SceneHost {
    /// Creates an empty, non-rendering object used to group others.
    fn create_group(&mut self, name: &str, parent: Option<ObjectHandle>) -> Result<ObjectHandle>;

    fn create_primitive(&mut self, spec: &PrimitiveSpec) -> Result<ObjectHandle>;

    /// Instantiates a structure prefab at `transform`.
    fn instantiate_template(
        &mut self,
        template: &StructureTemplate,
        transform: &Transform,
    ) -> Result<ObjectHandle>;

    fn create_light(&mut self, position: Vector3, settings: &LightSettings) -> Result<ObjectHandle>;

    fn create_reflection_probe(&mut self, spec: &ProbeSpec) -> Result<ObjectHandle>;

    /// Reparents `child` below `parent`, keeping its world transform.
    fn set_parent(&mut self, child: ObjectHandle, parent: ObjectHandle) -> Result<()>;

    /// Direct children of `handle`; empty for unknown handles.
    fn children(&self, handle: ObjectHandle) -> Vec<ObjectHandle>;

    /// Destroys `handle` together with everything below it.
    fn destroy_group(&mut self, handle: ObjectHandle) -> Result<()>;

    fn has_renderer(&self, handle: ObjectHandle) -> bool;

    fn set_static(&mut self, handle: ObjectHandle, is_static: bool) -> Result<()>;

    fn set_renderer_enabled(&mut self, handle: ObjectHandle, enabled: bool) -> Result<()>;
}
