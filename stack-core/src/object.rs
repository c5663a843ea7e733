//! The stack node: property bag, generator and cached result.
//!
//! [`StackObject::evaluate`] is called once per scene evaluation. It either
//! hands back the previously built container or runs the whole pipeline
//! again:
//!
//! ```text
//!   settings ──► StackParameters ──► StackGenerator::initialize
//!                                          │
//!                  path (optional) ──► StackGenerator::generate
//!                                          │
//!   first child ─────────────────► build_stack_geometry ──► container
//! ```

use glam::Affine3A;
use log::{debug, warn};

use crate::{
    config::StackSettings,
    dependency::DependencyTracker,
    error::Result,
    generator::StackGenerator,
    params::StackParameters,
    scene::Scene,
    types::{NodeId, Revision},
};

/// A built container and the placement it was built for.
#[derive(Clone, Copy, Debug)]
struct CachedStack {
    container: NodeId,
    /// Stamp of the container right after the build. A freed and reused
    /// slot always carries a newer one.
    stamp: Revision,
    node_world: Affine3A,
    path_world: Option<Affine3A>,
}

impl CachedStack {
    /// Whether the container slot still holds the node that was built.
    fn is_live(&self, scene: &Scene) -> bool {
        scene.contains(self.container) && scene.revision(self.container) == self.stamp
    }
}

/// Generator node that replicates its first child into a stack.
#[derive(Debug)]
pub struct StackObject {
    /// Scene node this object is attached to.
    node: NodeId,
    settings: StackSettings,
    generator: StackGenerator,
    /// Result of the last successful regeneration.
    cache: Option<CachedStack>,
    /// Path linked when the cache was built.
    last_path: Option<NodeId>,
    /// Scene clock at the end of the last successful regeneration.
    seen: Revision,
    regenerations: usize,
}

impl StackObject {
    /// Attaches a stack generator with default settings to `node`.
    pub fn new(node: NodeId) -> Self {
        Self::with_settings(node, StackSettings::default())
    }

    pub fn with_settings(node: NodeId, mut settings: StackSettings) -> Self {
        settings.validate();
        Self {
            node,
            settings,
            generator: StackGenerator::new(),
            cache: None,
            last_path: None,
            seen: 0,
            regenerations: 0,
        }
    }

    /// Copy of this object for a duplicated node.
    ///
    /// Settings and the last used path travel along; the generator and the
    /// cached result do not, so the copy regenerates on first evaluation.
    pub fn duplicate(&self, node: NodeId) -> Self {
        Self {
            last_path: self.last_path,
            ..Self::with_settings(node, self.settings.clone())
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn settings(&self) -> &StackSettings {
        &self.settings
    }

    /// Replaces the settings after validating them. The node is marked as
    /// changed only if the validated settings differ from the current ones.
    pub fn set_settings(&mut self, scene: &mut Scene, mut settings: StackSettings) -> Result<()> {
        settings.validate();
        if settings != self.settings {
            self.settings = settings;
            scene.touch(self.node)?;
        }
        Ok(())
    }

    /// Container of the last successful regeneration, if still valid.
    pub fn cache(&self) -> Option<NodeId> {
        self.cache.map(|c| c.container)
    }

    /// Number of times the pipeline ran to completion.
    pub fn regenerations(&self) -> usize {
        self.regenerations
    }

    pub fn generator(&self) -> &StackGenerator {
        &self.generator
    }

    /// Sets the row height to the height of the first child's bounds.
    ///
    /// ### Returns
    /// The new row height, or `None` if there is no child or it has no
    /// measurable height.
    pub fn fit_row_height(&mut self, scene: &mut Scene) -> Result<Option<f32>> {
        let Some(child) = scene.first_child(self.node) else {
            return Ok(None);
        };
        let Some(bounds) = scene.hierarchy_bounds(child) else {
            return Ok(None);
        };

        let height = bounds.size().y;
        if height <= 0.0 {
            return Ok(None);
        }

        let settings = StackSettings {
            row_height: height,
            ..self.settings.clone()
        };
        self.set_settings(scene, settings)?;
        Ok(Some(height))
    }

    /// Produces the stack for the current scene state.
    ///
    /// ### Returns
    /// - `Ok(Some(container))` with either the cached or a fresh container.
    /// - `Ok(None)` if there is nothing to replicate.
    /// - `Err` if regeneration failed. The previous container is discarded
    ///   in that case and the next evaluation tries again.
    pub fn evaluate<T: DependencyTracker>(
        &mut self,
        scene: &mut Scene,
        tracker: &mut T,
    ) -> Result<Option<NodeId>> {
        scene.get(self.node)?;

        let Some(source) = scene.first_child(self.node) else {
            self.discard_cache(scene);
            return Ok(None);
        };

        tracker.begin();
        let path = self.linked_path(scene);
        if let Some(path) = path {
            tracker.declare(path, scene.revision(path));
        }

        // Path items depend on both world transforms, so moving an ancestor
        // of either node invalidates the result.
        let node_world = scene.world_transform(self.node);
        let path_world = path.map(|p| scene.world_transform(p));

        let dirty = tracker.compare_with_previous()
            || self.cache.is_none_or(|c| {
                !c.is_live(scene) || c.node_world != node_world || c.path_world != path_world
            })
            || scene.subtree_revision(self.node) > self.seen
            || path != self.last_path;

        if !dirty {
            self.hide_inputs(scene)?;
            return Ok(self.cache());
        }

        self.discard_cache(scene);

        let mut params = StackParameters::from(&self.settings);
        params.base_path = path;

        self.generator.initialize(&params)?;
        self.generator
            .generate(path.and_then(|p| scene.path_input(p)))?;

        let use_instancing = self.settings.use_instancing;
        let built = self
            .generator
            .build_geometry(scene, source, node_world, use_instancing)?;
        let Some(container) = built else {
            return Ok(None);
        };

        self.hide_inputs(scene)?;
        self.last_path = path;

        scene.touch(container)?;

        self.cache = Some(CachedStack {
            container,
            stamp: scene.revision(container),
            node_world,
            path_world,
        });
        self.seen = scene.clock();
        self.regenerations += 1;
        debug!(
            "stack {} regenerated: {} items, path {:?}",
            self.node,
            scene.children(container).len(),
            path
        );
        Ok(Some(container))
    }

    /// Path link from the settings, if it names a curve node.
    fn linked_path(&self, scene: &Scene) -> Option<NodeId> {
        let id = self.settings.base_path?;
        if scene.spline(id).is_some() {
            Some(id)
        } else {
            warn!("stack {}: base path {} is not a curve, ignoring it", self.node, id);
            None
        }
    }

    /// Hides the node's children; they only show up through the stack.
    fn hide_inputs(&self, scene: &mut Scene) -> Result<()> {
        for child in scene.children(self.node).to_vec() {
            scene.set_hidden(child, true)?;
        }
        Ok(())
    }

    /// Drops the cached container. A slot that now holds another node is
    /// left alone.
    fn discard_cache(&mut self, scene: &mut Scene) {
        if let Some(cached) = self.cache.take()
            && cached.is_live(scene)
        {
            scene.remove_subtree(cached.container);
        }
    }
}
