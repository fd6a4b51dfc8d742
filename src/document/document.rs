// src/document/document.rs

//! An in-memory scene graph that implements [`SceneHost`]. It is what the command
//! line tool generates into, and what the tests inspect.

use std::collections::HashMap;

use crate::config::{LightSettings, StructureTemplate};
use crate::error::{MazeError, Result};
use crate::layout::{PrimitiveShape, Surface};
use crate::scene::host::{ObjectHandle, PrimitiveSpec, ProbeSpec, SceneHost, Transform};
use crate::utils::Vector3;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Primitive {
        shape: PrimitiveShape,
        surface: Surface,
        tiling: Option<(usize, usize)>,
    },
    /// Root of an instantiated structure template.
    Structure { template: String },
    /// A part created together with a structure.
    StructurePart,
    Light(LightSettings),
    ReflectionProbe {
        size: Vector3,
        resolution: u32,
        box_projection: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub parent: Option<ObjectHandle>,
    pub children: Vec<ObjectHandle>,
    pub transform: Transform,
    pub is_static: bool,
    /// `None` for objects without a renderer (groups, lights, probes).
    pub renderer_enabled: Option<bool>,
}

impl SceneNode {
    fn new(name: &str, kind: NodeKind, transform: Transform, renders: bool) -> Self {
        Self {
            name: name.to_string(),
            kind,
            parent: None,
            children: Vec::new(),
            transform,
            is_static: false,
            renderer_enabled: renders.then_some(true),
        }
    }
}

/// Arena of scene nodes addressed by [`ObjectHandle`]. Destroyed slots are never
/// reused, so stale handles keep failing instead of aliasing new objects.
#[derive(Debug, Default)]
pub struct Document {
    nodes: Vec<Option<SceneNode>>,
    template_parts: HashMap<String, Vec<String>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the parts created along with every instance of `template`.
    pub fn register_template_parts(&mut self, template: &str, parts: &[&str]) {
        self.template_parts.insert(
            template.to_string(),
            parts.iter().map(|p| p.to_string()).collect(),
        );
    }

    pub fn node(&self, handle: ObjectHandle) -> Option<&SceneNode> {
        self.nodes.get(handle.0 as usize).and_then(|n| n.as_ref())
    }

    fn node_mut(&mut self, handle: ObjectHandle) -> Result<&mut SceneNode> {
        self.nodes
            .get_mut(handle.0 as usize)
            .and_then(|n| n.as_mut())
            .ok_or_else(|| MazeError::host(format!("unknown object handle {}", handle)))
    }

    fn insert(&mut self, node: SceneNode) -> ObjectHandle {
        self.nodes.push(Some(node));
        ObjectHandle((self.nodes.len() - 1) as u64)
    }

    /// Number of objects currently alive.
    pub fn live_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Objects without a parent, in creation order.
    pub fn roots(&self) -> Vec<ObjectHandle> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| matches!(n, Some(node) if node.parent.is_none()))
            .map(|(i, _)| ObjectHandle(i as u64))
            .collect()
    }

    /// Resolves a `/`-separated path of names starting at a root object, e.g.
    /// `"Generated Maze/Outer Walls"`.
    pub fn find_by_path(&self, path: &str) -> Option<ObjectHandle> {
        let mut parts = path.split('/');
        let first = parts.next()?;
        let mut current = self
            .roots()
            .into_iter()
            .find(|h| self.node(*h).is_some_and(|n| n.name == first))?;
        for part in parts {
            current = self
                .node(current)?
                .children
                .iter()
                .copied()
                .find(|h| self.node(*h).is_some_and(|n| n.name == part))?;
        }
        Some(current)
    }

    fn is_descendant(&self, candidate: ObjectHandle, ancestor: ObjectHandle) -> bool {
        let mut cursor = Some(candidate);
        while let Some(h) = cursor {
            if h == ancestor {
                return true;
            }
            cursor = self.node(h).and_then(|n| n.parent);
        }
        false
    }

    fn detach(&mut self, child: ObjectHandle) {
        let parent = self.node(child).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Ok(node) = self.node_mut(parent) {
                node.children.retain(|c| *c != child);
            }
        }
    }

    fn attach(&mut self, child: ObjectHandle, parent: Option<ObjectHandle>) -> Result<()> {
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.push(child);
        }
        self.node_mut(child)?.parent = parent;
        Ok(())
    }
}

impl SceneHost for Document {
    fn create_group(&mut self, name: &str, parent: Option<ObjectHandle>) -> Result<ObjectHandle> {
        if let Some(parent) = parent {
            self.node_mut(parent)?;
        }
        let transform = Transform::at(Vector3::ZERO);
        let handle = self.insert(SceneNode::new(name, NodeKind::Group, transform, false));
        self.attach(handle, parent)?;
        Ok(handle)
    }

    fn create_primitive(&mut self, spec: &PrimitiveSpec) -> Result<ObjectHandle> {
        let kind = NodeKind::Primitive {
            shape: spec.shape,
            surface: spec.surface,
            tiling: spec.tiling,
        };
        Ok(self.insert(SceneNode::new(spec.name, kind, spec.transform, true)))
    }

    fn instantiate_template(
        &mut self,
        template: &StructureTemplate,
        transform: &Transform,
    ) -> Result<ObjectHandle> {
        let kind = NodeKind::Structure {
            template: template.name.clone(),
        };
        let root = self.insert(SceneNode::new(&template.name, kind, *transform, true));
        let parts = self.template_parts.get(&template.name).cloned().unwrap_or_default();
        for part in parts {
            let node = SceneNode::new(&part, NodeKind::StructurePart, *transform, true);
            let handle = self.insert(node);
            self.attach(handle, Some(root))?;
        }
        Ok(root)
    }

    fn create_light(
        &mut self,
        position: Vector3,
        settings: &LightSettings,
    ) -> Result<ObjectHandle> {
        Ok(self.insert(SceneNode::new(
            "Light",
            NodeKind::Light(settings.clone()),
            Transform::at(position),
            false,
        )))
    }

    fn create_reflection_probe(&mut self, spec: &ProbeSpec) -> Result<ObjectHandle> {
        let kind = NodeKind::ReflectionProbe {
            size: spec.size,
            resolution: spec.resolution,
            box_projection: spec.box_projection,
        };
        let transform = Transform::at(spec.position);
        Ok(self.insert(SceneNode::new("ReflectionProbe", kind, transform, false)))
    }

    fn set_parent(&mut self, child: ObjectHandle, parent: ObjectHandle) -> Result<()> {
        self.node_mut(child)?;
        self.node_mut(parent)?;
        if self.is_descendant(parent, child) {
            return Err(MazeError::host(format!(
                "cannot parent {} below its own descendant {}",
                child, parent
            )));
        }
        self.detach(child);
        self.attach(child, Some(parent))
    }

    fn children(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
        self.node(handle).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn destroy_group(&mut self, handle: ObjectHandle) -> Result<()> {
        self.node_mut(handle)?;
        self.detach(handle);
        let mut pending = vec![handle];
        while let Some(h) = pending.pop() {
            if let Some(node) = self.nodes.get_mut(h.0 as usize).and_then(|n| n.take()) {
                pending.extend(node.children);
            }
        }
        Ok(())
    }

    fn has_renderer(&self, handle: ObjectHandle) -> bool {
        self.node(handle).is_some_and(|n| n.renderer_enabled.is_some())
    }

    fn set_static(&mut self, handle: ObjectHandle, is_static: bool) -> Result<()> {
        self.node_mut(handle)?.is_static = is_static;
        Ok(())
    }

    fn set_renderer_enabled(&mut self, handle: ObjectHandle, enabled: bool) -> Result<()> {
        let node = self.node_mut(handle)?;
        match node.renderer_enabled.as_mut() {
            Some(flag) => {
                *flag = enabled;
                Ok(())
            }
            None => Err(MazeError::host(format!("object {} has no renderer", handle))),
        }
    }
}
