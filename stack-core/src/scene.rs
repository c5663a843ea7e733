//! Minimal scene graph the stack generator plugs into.
//!
//! Nodes live in a slot arena addressed by [`NodeId`]. The scene keeps a
//! monotonic clock; every data, matrix or topology change stamps the node
//! with the next clock value. Generators compare stamps against the clock
//! value they last saw to decide whether their inputs changed.

use glam::Affine3A;

use crate::{
    error::{Result, StackError},
    mesh::{Aabb, Mesh},
    path::{PathInput, PathKey, Spline},
    types::{NodeId, Revision},
};

/// What a node carries.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Empty grouping node.
    Null,
    Mesh(Mesh),
    /// Lightweight reference that renders another node's geometry.
    Instance { target: Option<NodeId> },
    Spline(Spline),
}

#[derive(Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    /// Transform relative to the parent.
    pub local: Affine3A,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Set while a generator consumes the node as input.
    pub hidden: bool,
    revision: Revision,
}

impl SceneNode {
    fn new(name: String, kind: NodeKind, revision: Revision) -> Self {
        Self {
            name,
            kind,
            local: Affine3A::IDENTITY,
            parent: None,
            children: Vec::new(),
            hidden: false,
            revision,
        }
    }

    /// Stamp of the last change to this node.
    pub fn revision(&self) -> Revision {
        self.revision
    }
}

#[derive(Debug, Default)]
pub struct Scene {
    slots: Vec<Option<SceneNode>>,
    free: Vec<NodeId>,
    clock: Revision,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current clock value. Every stamp handed out so far is `<=` this.
    #[inline]
    pub fn clock(&self) -> Revision {
        self.clock
    }

    fn stamp(&mut self) -> Revision {
        self.clock += 1;
        self.clock
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Creates a detached node and returns its id.
    pub fn add_node(&mut self, name: impl Into<String>, kind: NodeKind) -> Result<NodeId> {
        let revision = self.stamp();
        let node = SceneNode::new(name.into(), kind, revision);
        if let Some(id) = self.free.pop() {
            self.slots[id] = Some(node);
            return Ok(id);
        }
        self.slots.try_reserve(1)?;
        self.slots.push(Some(node));
        Ok(self.slots.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    /// Like [`Self::node`], but a missing node is an error.
    pub fn get(&self, id: NodeId) -> Result<&SceneNode> {
        self.node(id).ok_or(StackError::UnknownNode(id))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut SceneNode> {
        self.slots
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(StackError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Iterates over all live node ids.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|_| id))
    }

    /// Moves `child` to the end of `parent`'s children.
    pub fn insert_under_last(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?;
        self.get(child)?;
        self.detach(child);

        let revision = self.stamp();
        let p = self.get_mut(parent)?;
        p.children.try_reserve(1)?;
        p.children.push(child);
        p.revision = revision;

        let c = self.get_mut(child)?;
        c.parent = Some(parent);
        c.revision = revision;
        Ok(())
    }

    /// Unlinks `id` from its parent, leaving it as a detached root.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return;
        };
        let revision = self.stamp();
        if let Ok(p) = self.get_mut(parent) {
            p.children.retain(|&c| c != id);
            p.revision = revision;
        }
        if let Ok(n) = self.get_mut(id) {
            n.parent = None;
        }
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.children.first().copied())
    }

    /// Children of `id` in order; empty for unknown nodes.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
    }

    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<()> {
        let revision = self.stamp();
        let n = self.get_mut(id)?;
        n.name = name.into();
        n.revision = revision;
        Ok(())
    }

    pub fn set_local(&mut self, id: NodeId, local: Affine3A) -> Result<()> {
        let revision = self.stamp();
        let n = self.get_mut(id)?;
        n.local = local;
        n.revision = revision;
        Ok(())
    }

    /// Product of all local transforms from the root down to `id`.
    pub fn world_transform(&self, id: NodeId) -> Affine3A {
        let mut m = Affine3A::IDENTITY;
        let mut cur = Some(id);
        while let Some(n) = cur.and_then(|c| self.node(c)) {
            m = n.local * m;
            cur = n.parent;
        }
        m
    }

    /// Mutable access to a node's payload. Stamps the node.
    pub fn kind_mut(&mut self, id: NodeId) -> Result<&mut NodeKind> {
        let revision = self.stamp();
        let n = self.get_mut(id)?;
        n.revision = revision;
        Ok(&mut n.kind)
    }

    /// Marks the node's data as changed without touching it otherwise.
    pub fn touch(&mut self, id: NodeId) -> Result<()> {
        let revision = self.stamp();
        self.get_mut(id)?.revision = revision;
        Ok(())
    }

    /// Hides or shows a node. This is evaluation state and does not stamp.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> Result<()> {
        self.get_mut(id)?.hidden = hidden;
        Ok(())
    }

    /// Stamp of the last change to `id`, or `0` for unknown nodes.
    pub fn revision(&self, id: NodeId) -> Revision {
        self.node(id).map_or(0, SceneNode::revision)
    }

    /// Latest stamp anywhere in the subtree rooted at `id`.
    pub fn subtree_revision(&self, id: NodeId) -> Revision {
        let Some(n) = self.node(id) else {
            return 0;
        };
        n.children
            .iter()
            .map(|&c| self.subtree_revision(c))
            .fold(n.revision, Revision::max)
    }

    /// Deep-copies the subtree rooted at `id`. The copy is detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId> {
        let src = self.get(id)?;
        let (name, kind, local, children) =
            (src.name.clone(), src.kind.clone(), src.local, src.children.clone());

        let copy = self.add_node(name, kind)?;
        self.get_mut(copy)?.local = local;
        for child in children {
            let c = self.clone_subtree(child)?;
            self.insert_under_last(copy, c)?;
        }
        Ok(copy)
    }

    /// Removes `id` and all its descendants, freeing their slots.
    pub fn remove_subtree(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        self.detach(id);

        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.slots.get_mut(cur).and_then(Option::take) {
                stack.extend(node.children);
                self.free.push(cur);
            }
        }
    }

    /// The node's curve, if it is a spline node.
    pub fn spline(&self, id: NodeId) -> Option<&Spline> {
        match &self.node(id)?.kind {
            NodeKind::Spline(s) => Some(s),
            _ => None,
        }
    }

    /// Borrowed path view of a spline node for one generation pass.
    pub fn path_input(&self, id: NodeId) -> Option<PathInput<'_>> {
        let spline = self.spline(id)?;
        Some(PathInput {
            key: PathKey {
                node: id,
                revision: self.revision(id),
            },
            curve: spline,
            world: self.world_transform(id),
        })
    }

    /// Target of an instance node.
    pub fn instance_target(&self, id: NodeId) -> Option<NodeId> {
        match self.node(id)?.kind {
            NodeKind::Instance { target } => target,
            _ => None,
        }
    }

    /// Bounds of all mesh geometry in the subtree of `id`, in the space of
    /// `id` itself. Instances contribute their target's geometry, resolved
    /// one level deep.
    pub fn hierarchy_bounds(&self, id: NodeId) -> Option<Aabb> {
        self.bounds_in(id, Affine3A::IDENTITY, true)
    }

    fn bounds_in(&self, id: NodeId, to_root: Affine3A, follow_instance: bool) -> Option<Aabb> {
        let node = self.node(id)?;
        let own = match &node.kind {
            NodeKind::Mesh(mesh) => mesh.bounds().map(|b| b.transformed(&to_root)),
            NodeKind::Instance { target: Some(t) } if follow_instance => {
                self.bounds_in(*t, to_root, false)
            }
            _ => None,
        };

        node.children.iter().fold(own, |acc, &c| {
            let local = self.node(c).map_or(Affine3A::IDENTITY, |n| n.local);
            match (acc, self.bounds_in(c, to_root * local, follow_instance)) {
                (Some(a), Some(b)) => Some(a.union(&b)),
                (a, b) => a.or(b),
            }
        })
    }
}
