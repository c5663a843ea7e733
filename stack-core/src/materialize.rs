//! Turns a finished layout into scene nodes.

use glam::Affine3A;

use crate::{
    error::Result,
    generator::{ItemSpace, StackLayout},
    scene::{NodeKind, Scene},
    types::NodeId,
};

/// Display name of the container that holds a generated stack.
pub const STACK_NAME: &str = "Stack";

/// Builds one positioned copy of `original` per layout slot.
///
/// A new detached container node is created and every item is appended as
/// its last child, in row-major, then item-major order. If `original` is an
/// instance, the node it points at is copied instead; only that one hop is
/// resolved.
///
/// The first item is always a deep copy. With `use_instancing` every later
/// item is an instance of that first copy; otherwise each item is a deep
/// copy of its own.
///
/// ### Parameters
/// - `scene` - Scene that receives the new nodes.
/// - `original` - Template node to replicate.
/// - `mg` - World transform of the generating node. World-space layouts are
///   brought back into its local space with the inverse.
/// - `layout` - Item transforms and the space they are in.
/// - `use_instancing` - Emit instances for all items after the first.
///
/// ### Returns
/// - `Ok(Some(container))` on success. The caller owns the container.
/// - `Ok(None)` if an instance template points nowhere.
/// - `Err` if a node could not be created; nothing is left behind.
pub fn build_stack_geometry(
    scene: &mut Scene,
    original: NodeId,
    mg: Affine3A,
    layout: StackLayout<'_>,
    use_instancing: bool,
) -> Result<Option<NodeId>> {
    let source = match scene.get(original)?.kind {
        NodeKind::Instance { target } => target.filter(|&t| scene.contains(t)),
        _ => Some(original),
    };
    let Some(source) = source else {
        return Ok(None);
    };

    let container = scene.add_node(STACK_NAME, NodeKind::Null)?;
    match fill(scene, container, source, mg, layout, use_instancing) {
        Ok(()) => Ok(Some(container)),
        Err(err) => {
            scene.remove_subtree(container);
            Err(err)
        }
    }
}

fn fill(
    scene: &mut Scene,
    container: NodeId,
    source: NodeId,
    mg: Affine3A,
    layout: StackLayout<'_>,
    use_instancing: bool,
) -> Result<()> {
    let inverse = mg.inverse();
    let name = scene.get(source)?.name.clone();
    let mut first: Option<NodeId> = None;

    for transform in layout.items.iter() {
        let item = match first {
            Some(target) if use_instancing => scene.add_node(
                name.as_str(),
                NodeKind::Instance {
                    target: Some(target),
                },
            )?,
            _ => {
                let copy = scene.clone_subtree(source)?;
                first.get_or_insert(copy);
                copy
            }
        };

        let local = match layout.space {
            ItemSpace::World => inverse * *transform,
            ItemSpace::Local => *transform,
        };
        scene.set_local(item, local)?;
        scene.insert_under_last(container, item)?;
    }

    Ok(())
}
