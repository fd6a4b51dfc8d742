// src/scene/mod.rs
pub mod builder;
pub mod host;

pub use builder::{GeneratedHandleSet, GroupHandles, SceneBuilder};
pub use host::{ObjectHandle, PrimitiveSpec, ProbeSpec, SceneGroup, SceneHost, Transform};
