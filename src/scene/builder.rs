// src/scene/builder.rs

//! Materialises a [`LayoutPlan`] through a [`SceneHost`] and remembers every handle it
//! created, so the whole maze can later be cleared, marked static or hidden.

use log::{debug, error};

use crate::config::StructureTemplate;
use crate::error::{MazeError, Result};
use crate::layout::{LayoutPlan, PlacementInstruction, PrimitiveShape, Surface};
use crate::scene::host::{
    ObjectHandle, PrimitiveSpec, ProbeSpec, SceneGroup, SceneHost, Transform,
};
use crate::schedule::{checkpoint, CancellationToken, Scheduler};
use crate::utils::Rotation;

/// Handles created by the last generation pass, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedHandleSet {
    handles: Vec<ObjectHandle>,
}

impl GeneratedHandleSet {
    pub fn push(&mut self, handle: ObjectHandle) {
        self.handles.push(handle);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectHandle> {
        self.handles.iter()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn clear(&mut self) {
        self.handles.clear();
    }
}

/// Root and group objects of one generated maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupHandles {
    pub root: ObjectHandle,
    pub walls: ObjectHandle,
    pub structures: ObjectHandle,
    pub ground: ObjectHandle,
    pub roof: ObjectHandle,
    pub outer_walls: ObjectHandle,
    pub lights: ObjectHandle,
    pub reflection_probes: ObjectHandle,
}

#[derive(Debug, Default)]
pub struct SceneBuilder {
    groups: Option<GroupHandles>,
    handles: GeneratedHandleSet,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handles(&self) -> &GeneratedHandleSet {
        &self.handles
    }

    /// Root and groups of the current maze, if one has been started.
    pub fn groups(&self) -> Option<&GroupHandles> {
        self.groups.as_ref()
    }

    /// Creates the root object (below `parent`, if any) and one group per
    /// [`SceneGroup`].
    ///
    /// If a group cannot be created the root is destroyed again, so a failed start
    /// leaves nothing behind.
    pub fn begin<H: SceneHost>(
        &mut self,
        host: &mut H,
        parent: Option<ObjectHandle>,
    ) -> Result<GroupHandles> {
        let root = host.create_group(SceneGroup::ROOT_NAME, parent)?;
        match Self::create_groups(host, root) {
            Ok(groups) => {
                self.groups = Some(groups);
                Ok(groups)
            }
            Err(err) => {
                discard(host, root);
                Err(err)
            }
        }
    }

    fn create_groups<H: SceneHost>(host: &mut H, root: ObjectHandle) -> Result<GroupHandles> {
        let mut group = |g: SceneGroup| host.create_group(g.name(), Some(root));
        Ok(GroupHandles {
            root,
            walls: group(SceneGroup::Walls)?,
            structures: group(SceneGroup::Structures)?,
            ground: group(SceneGroup::Ground)?,
            roof: group(SceneGroup::Roof)?,
            outer_walls: group(SceneGroup::OuterWalls)?,
            lights: group(SceneGroup::Lights)?,
            reflection_probes: group(SceneGroup::ReflectionProbes)?,
        })
    }

    /// Parents a freshly created object and records it. An object the host refuses to
    /// parent is destroyed again.
    fn adopt<H: SceneHost>(
        &mut self,
        host: &mut H,
        handle: ObjectHandle,
        parent: ObjectHandle,
    ) -> Result<()> {
        if let Err(err) = host.set_parent(handle, parent) {
            discard(host, handle);
            return Err(err);
        }
        self.handles.push(handle);
        Ok(())
    }

    fn primitive<H: SceneHost>(
        &mut self,
        host: &mut H,
        spec: PrimitiveSpec,
        parent: ObjectHandle,
    ) -> Result<()> {
        let handle = host.create_primitive(&spec)?;
        self.adopt(host, handle, parent)
    }

    /// Creates the object described by `instruction` and parents it under its group.
    pub fn apply<H: SceneHost>(
        &mut self,
        host: &mut H,
        groups: &GroupHandles,
        instruction: &PlacementInstruction,
        templates: &[StructureTemplate],
    ) -> Result<()> {
        match instruction {
            PlacementInstruction::Wall { position, rotation, scale, .. } => self.primitive(
                host,
                PrimitiveSpec {
                    name: instruction.name(),
                    shape: PrimitiveShape::Cube,
                    surface: Surface::Wall,
                    transform: Transform::new(*position, *rotation, *scale),
                    tiling: None,
                },
                groups.walls,
            ),
            PlacementInstruction::OuterWall { position, rotation, scale } => self.primitive(
                host,
                PrimitiveSpec {
                    name: instruction.name(),
                    shape: PrimitiveShape::Cube,
                    surface: Surface::Wall,
                    transform: Transform::new(*position, *rotation, *scale),
                    tiling: None,
                },
                groups.outer_walls,
            ),
            PlacementInstruction::GroundPlane { position, scale, tiling } => self.primitive(
                host,
                PrimitiveSpec {
                    name: instruction.name(),
                    shape: PrimitiveShape::Plane,
                    surface: Surface::Ground,
                    transform: Transform::new(*position, Rotation::IDENTITY, *scale),
                    tiling: Some(*tiling),
                },
                groups.ground,
            ),
            PlacementInstruction::RoofPlane { position, rotation, scale, tiling } => self.primitive(
                host,
                PrimitiveSpec {
                    name: instruction.name(),
                    shape: PrimitiveShape::Plane,
                    surface: Surface::Roof,
                    transform: Transform::new(*position, *rotation, *scale),
                    tiling: Some(*tiling),
                },
                groups.roof,
            ),
            PlacementInstruction::Structure { template_index, position, rotation, scale, .. } => {
                let template = templates.get(*template_index).ok_or_else(|| {
                    MazeError::invalid_config(format!(
                        "structure template {} does not exist ({} configured)",
                        template_index,
                        templates.len()
                    ))
                })?;
                let transform = Transform::new(*position, *rotation, *scale);
                let handle = host.instantiate_template(template, &transform)?;
                self.adopt(host, handle, groups.structures)?;
                for child in host.children(handle) {
                    self.handles.push(child);
                }
                Ok(())
            }
            PlacementInstruction::Light { position, settings } => {
                let handle = host.create_light(*position, settings)?;
                self.adopt(host, handle, groups.lights)
            }
            PlacementInstruction::ReflectionProbe {
                position,
                size,
                resolution,
                box_projection,
            } => {
                let handle = host.create_reflection_probe(&ProbeSpec {
                    position: *position,
                    size: *size,
                    resolution: *resolution,
                    box_projection: *box_projection,
                })?;
                self.adopt(host, handle, groups.reflection_probes)
            }
        }
    }

    /// Builds the whole plan below a fresh root, suspending after the ground, the roof,
    /// every outer wall pair, every obstacle row and every probe.
    ///
    /// A host error stops the build where it happened; call [`SceneBuilder::clear`] to
    /// remove the partial maze.
    pub async fn build<H: SceneHost, S: Scheduler>(
        &mut self,
        host: &mut H,
        parent: Option<ObjectHandle>,
        plan: LayoutPlan,
        templates: &[StructureTemplate],
        scheduler: &S,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let result = self.build_inner(host, parent, plan, templates, scheduler, cancel).await;
        if let Err(MazeError::Host(msg)) = &result {
            error!("Scene host rejected the maze build: {}", msg);
        }
        result
    }

    async fn build_inner<H: SceneHost, S: Scheduler>(
        &mut self,
        host: &mut H,
        parent: Option<ObjectHandle>,
        plan: LayoutPlan,
        templates: &[StructureTemplate],
        scheduler: &S,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let groups = self.begin(host, parent)?;

        self.apply(host, &groups, &plan.ground, templates)?;
        checkpoint(scheduler, cancel).await?;
        self.apply(host, &groups, &plan.roof, templates)?;
        checkpoint(scheduler, cancel).await?;

        for pair in &plan.outer_walls {
            for instruction in pair {
                self.apply(host, &groups, instruction, templates)?;
            }
            checkpoint(scheduler, cancel).await?;
        }

        for row in &plan.obstacle_rows {
            for instruction in row {
                self.apply(host, &groups, instruction, templates)?;
            }
            checkpoint(scheduler, cancel).await?;
        }

        if plan.reflection_probes.is_empty() {
            host.destroy_group(groups.reflection_probes)?;
        } else {
            for probe in &plan.reflection_probes {
                self.apply(host, &groups, probe, templates)?;
                checkpoint(scheduler, cancel).await?;
            }
        }

        debug!("Scene build finished with {} generated objects", self.handles.len());
        Ok(())
    }

    /// Destroys the generated root and forgets every handle. Does nothing when nothing
    /// has been generated.
    pub fn clear<H: SceneHost>(&mut self, host: &mut H) -> Result<()> {
        if let Some(groups) = self.groups.take() {
            host.destroy_group(groups.root)?;
        }
        self.handles.clear();
        Ok(())
    }

    /// Applies the static flag to every generated object that renders.
    pub fn set_static<H: SceneHost>(&self, host: &mut H, is_static: bool) -> Result<()> {
        for handle in self.handles.iter() {
            if host.has_renderer(*handle) {
                host.set_static(*handle, is_static)?;
            }
        }
        Ok(())
    }

    /// Shows or hides every generated object that renders. Returns how many were
    /// touched.
    pub fn set_visible<H: SceneHost>(&self, host: &mut H, visible: bool) -> Result<usize> {
        let mut touched = 0;
        for handle in self.handles.iter() {
            if host.has_renderer(*handle) {
                host.set_renderer_enabled(*handle, visible)?;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

/// Best-effort removal of an object that could not be attached to the maze.
fn discard<H: SceneHost>(host: &mut H, handle: ObjectHandle) {
    if let Err(err) = host.destroy_group(handle) {
        error!("Could not remove orphaned object {}: {}", handle, err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LightSettings, MazeConfig, ReflectionProbeSettings};
    use crate::document::{Document, NodeKind};
    use crate::layout::LayoutPlanner;
    use crate::map::{Grid, MazeCarver};
    use crate::schedule::Immediate;
    use crate::utils::Vector3;
    use futures::executor::block_on;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Wraps a document and starts refusing calls once a budget runs out.
    struct FlakyHost {
        inner: Document,
        objects_left: usize,
        groups_left: usize,
        parents_left: usize,
    }

    impl FlakyHost {
        fn new() -> Self {
            Self {
                inner: Document::new(),
                objects_left: usize::MAX,
                groups_left: usize::MAX,
                parents_left: usize::MAX,
            }
        }

        fn with_objects(objects_left: usize) -> Self {
            Self { objects_left, ..Self::new() }
        }
    }

    fn spend(budget: &mut usize, what: &str) -> Result<()> {
        if *budget == 0 {
            return Err(MazeError::host(format!("out of {}", what)));
        }
        *budget -= 1;
        Ok(())
    }

    impl SceneHost for FlakyHost {
        fn create_group(
            &mut self,
            name: &str,
            parent: Option<ObjectHandle>,
        ) -> Result<ObjectHandle> {
            spend(&mut self.groups_left, "group slots")?;
            self.inner.create_group(name, parent)
        }
        fn create_primitive(&mut self, spec: &PrimitiveSpec) -> Result<ObjectHandle> {
            spend(&mut self.objects_left, "object slots")?;
            self.inner.create_primitive(spec)
        }
        fn instantiate_template(
            &mut self,
            template: &StructureTemplate,
            transform: &Transform,
        ) -> Result<ObjectHandle> {
            spend(&mut self.objects_left, "object slots")?;
            self.inner.instantiate_template(template, transform)
        }
        fn create_light(
            &mut self,
            position: Vector3,
            settings: &LightSettings,
        ) -> Result<ObjectHandle> {
            spend(&mut self.objects_left, "object slots")?;
            self.inner.create_light(position, settings)
        }
        fn create_reflection_probe(&mut self, spec: &ProbeSpec) -> Result<ObjectHandle> {
            spend(&mut self.objects_left, "object slots")?;
            self.inner.create_reflection_probe(spec)
        }
        fn set_parent(&mut self, child: ObjectHandle, parent: ObjectHandle) -> Result<()> {
            spend(&mut self.parents_left, "reparent calls")?;
            self.inner.set_parent(child, parent)
        }
        fn children(&self, handle: ObjectHandle) -> Vec<ObjectHandle> {
            self.inner.children(handle)
        }
        fn destroy_group(&mut self, handle: ObjectHandle) -> Result<()> {
            self.inner.destroy_group(handle)
        }
        fn has_renderer(&self, handle: ObjectHandle) -> bool {
            self.inner.has_renderer(handle)
        }
        fn set_static(&mut self, handle: ObjectHandle, is_static: bool) -> Result<()> {
            self.inner.set_static(handle, is_static)
        }
        fn set_renderer_enabled(&mut self, handle: ObjectHandle, enabled: bool) -> Result<()> {
            self.inner.set_renderer_enabled(handle, enabled)
        }
    }

    fn plan_for(config: &MazeConfig, seed: u64) -> LayoutPlan {
        let mut grid = Grid::new(config.width, config.depth);
        let mut rng = StdRng::seed_from_u64(seed);
        MazeCarver::carve(&mut grid, &mut rng).unwrap();
        LayoutPlanner::new(config).plan(&grid, &mut rng).unwrap()
    }

    fn build(
        builder: &mut SceneBuilder,
        host: &mut impl SceneHost,
        config: &MazeConfig,
        plan: LayoutPlan,
    ) -> Result<()> {
        block_on(builder.build(
            host,
            None,
            plan,
            &config.structure_templates,
            &Immediate,
            &CancellationToken::new(),
        ))
    }

    #[test]
    fn test_build_records_every_object() {
        let config = MazeConfig { width: 7, depth: 7, ..MazeConfig::default() };
        let plan = plan_for(&config, 3);
        let expected = plan.counts().total();

        let mut doc = Document::new();
        let mut builder = SceneBuilder::new();
        build(&mut builder, &mut doc, &config, plan).unwrap();

        // The default "Pillar" template has no registered parts, so one handle per
        // instruction.
        assert_eq!(builder.handles().len(), expected);
        let groups = *builder.groups().unwrap();
        assert_eq!(doc.node(groups.root).unwrap().name, SceneGroup::ROOT_NAME);
        assert_eq!(doc.children(groups.outer_walls).len(), 2 * (7 + 7 + 2));
        assert_eq!(doc.children(groups.ground).len(), 1);
        assert_eq!(doc.children(groups.roof).len(), 1);
        // Probes are disabled, so their group is gone.
        assert!(doc.node(groups.reflection_probes).is_none());
        assert!(doc.find_by_path("Generated Maze/Reflection Probes").is_none());
        assert!(doc.find_by_path("Generated Maze/Lights").is_some());
    }

    #[test]
    fn test_structure_children_are_tracked() {
        let config = MazeConfig {
            width: 5,
            depth: 5,
            wall_spawn_percentage: 0,
            structure_spawn_percentage: 100,
            ..MazeConfig::default()
        };
        let plan = plan_for(&config, 1);
        let structures = plan.counts().structures;
        assert!(structures > 0);

        let mut doc = Document::new();
        doc.register_template_parts("Pillar", &["Base", "Column"]);
        let mut builder = SceneBuilder::new();
        build(&mut builder, &mut doc, &config, plan.clone()).unwrap();
        assert_eq!(builder.handles().len(), plan.counts().total() + 2 * structures);
    }

    #[test]
    fn test_probes_are_parented() {
        let config = MazeConfig {
            width: 3,
            depth: 3,
            reflection_probes: ReflectionProbeSettings { enabled: true, ..Default::default() },
            ..MazeConfig::default()
        };
        let plan = plan_for(&config, 2);
        let mut doc = Document::new();
        let mut builder = SceneBuilder::new();
        build(&mut builder, &mut doc, &config, plan).unwrap();

        let probes = builder.groups().unwrap().reflection_probes;
        let children = doc.children(probes);
        assert_eq!(children.len(), 25);
        assert!(matches!(
            doc.node(children[0]).unwrap().kind,
            NodeKind::ReflectionProbe { resolution: 1024, box_projection: true, .. }
        ));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let config = MazeConfig { width: 5, depth: 5, ..MazeConfig::default() };
        let mut doc = Document::new();
        let mut builder = SceneBuilder::new();

        builder.clear(&mut doc).unwrap();
        build(&mut builder, &mut doc, &config, plan_for(&config, 4)).unwrap();
        assert!(doc.live_count() > 0);

        builder.clear(&mut doc).unwrap();
        assert!(builder.handles().is_empty());
        assert!(builder.groups().is_none());
        assert_eq!(doc.live_count(), 0);

        builder.clear(&mut doc).unwrap();
        assert_eq!(doc.live_count(), 0);
    }

    #[test]
    fn test_visibility_skips_non_renderers() {
        let config = MazeConfig { width: 9, depth: 9, ..MazeConfig::default() };
        let plan = plan_for(&config, 6);
        let counts = plan.counts();
        let mut doc = Document::new();
        let mut builder = SceneBuilder::new();
        build(&mut builder, &mut doc, &config, plan).unwrap();

        let touched = builder.set_visible(&mut doc, false).unwrap();
        assert_eq!(touched, builder.handles().len() - counts.lights);
        for handle in builder.handles().iter() {
            let node = doc.node(*handle).unwrap();
            assert_ne!(node.renderer_enabled, Some(true));
        }

        builder.set_visible(&mut doc, true).unwrap();
        for handle in builder.handles().iter() {
            assert_ne!(doc.node(*handle).unwrap().renderer_enabled, Some(false));
        }
    }

    #[test]
    fn test_static_skips_non_renderers() {
        let config = MazeConfig {
            width: 5,
            depth: 5,
            reflection_probes: ReflectionProbeSettings { enabled: true, ..Default::default() },
            ..MazeConfig::default()
        };
        let plan = plan_for(&config, 6);
        let mut doc = Document::new();
        let mut builder = SceneBuilder::new();
        build(&mut builder, &mut doc, &config, plan).unwrap();

        builder.set_static(&mut doc, true).unwrap();
        for handle in builder.handles().iter() {
            let node = doc.node(*handle).unwrap();
            assert_eq!(node.is_static, node.renderer_enabled.is_some());
        }
        let groups = *builder.groups().unwrap();
        for probe in doc.children(groups.reflection_probes) {
            assert!(!doc.node(probe).unwrap().is_static);
        }
        for light in doc.children(groups.lights) {
            assert!(!doc.node(light).unwrap().is_static);
        }
    }

    #[test]
    fn test_bulk_flags_on_empty_set() {
        let mut doc = Document::new();
        let builder = SceneBuilder::new();
        assert_eq!(builder.set_visible(&mut doc, false).unwrap(), 0);
        assert!(builder.set_static(&mut doc, true).is_ok());
    }

    #[test]
    fn test_host_error_leaves_partial_build() {
        let config = MazeConfig { width: 7, depth: 7, ..MazeConfig::default() };
        let plan = plan_for(&config, 9);
        let mut host = FlakyHost::with_objects(10);
        let mut builder = SceneBuilder::new();

        let result = build(&mut builder, &mut host, &config, plan);
        assert!(matches!(result, Err(MazeError::Host(_))));
        assert_eq!(builder.handles().len(), 10);

        builder.clear(&mut host).unwrap();
        assert_eq!(host.inner.live_count(), 0);
    }

    #[test]
    fn test_group_failure_leaves_nothing_behind() {
        let config = MazeConfig { width: 5, depth: 5, ..MazeConfig::default() };
        let plan = plan_for(&config, 2);
        let mut host = FlakyHost { groups_left: 3, ..FlakyHost::new() };
        let mut builder = SceneBuilder::new();

        let result = build(&mut builder, &mut host, &config, plan);
        assert!(matches!(result, Err(MazeError::Host(_))));
        assert!(builder.groups().is_none());
        assert_eq!(host.inner.live_count(), 0);

        builder.clear(&mut host).unwrap();
        assert_eq!(host.inner.live_count(), 0);
    }

    #[test]
    fn test_reparent_failure_is_cleared() {
        let config = MazeConfig { width: 5, depth: 5, ..MazeConfig::default() };
        let mut builder = SceneBuilder::new();

        for parents_left in [0, 1, 4] {
            let plan = plan_for(&config, 8);
            let mut host = FlakyHost { parents_left, ..FlakyHost::new() };
            let result = build(&mut builder, &mut host, &config, plan);
            assert!(matches!(result, Err(MazeError::Host(_))));
            assert_eq!(builder.handles().len(), parents_left);

            builder.clear(&mut host).unwrap();
            assert_eq!(host.inner.live_count(), 0);
        }
    }

    #[test]
    fn test_missing_template_index() {
        let mut doc = Document::new();
        let mut builder = SceneBuilder::new();
        let groups = builder.begin(&mut doc, None).unwrap();
        let instruction = PlacementInstruction::Structure {
            cell: (0, 0),
            template_index: 3,
            position: Vector3::ZERO,
            rotation: Rotation::IDENTITY,
            scale: Vector3::ONE,
        };
        let result = builder.apply(&mut doc, &groups, &instruction, &[]);
        assert!(matches!(result, Err(MazeError::InvalidConfig(_))));
    }
}
