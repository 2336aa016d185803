//! Plane clipping of the editable objects.
//!
//! - [`registry`] turns plane objects into oriented half-spaces.
//! - [`toggle`] applies, removes and negates those half-spaces on every
//!   clippable mesh.
//! - [`stencil`] builds the stencil passes and caps that fill the cut faces.

pub mod registry;
pub mod stencil;
pub mod toggle;

pub use registry::{build_planes, PlaneRegistry};
pub use stencil::{add_caps, build_cap_mesh, build_stencil_group, CLIPPING_GROUP_NAME};
pub use toggle::ClipToggleController;

use crate::scene::{NodeId, NodeRole, Scene};

/// Direct children of `group` with the given mesh role, in child order.
pub fn children_with_role(scene: &Scene, group: NodeId, role: NodeRole) -> Vec<NodeId> {
    scene
        .children(group)
        .iter()
        .copied()
        .filter(|&id| scene.get(id).and_then(|node| node.role()) == Some(role))
        .collect()
}

/// Plane objects of the editable group, in creation order.
pub fn plane_objects(scene: &Scene, group: NodeId) -> Vec<NodeId> {
    children_with_role(scene, group, NodeRole::ClipPlane)
}

/// Meshes of the editable group that receive clip planes.
pub fn clippable_objects(scene: &Scene, group: NodeId) -> Vec<NodeId> {
    children_with_role(scene, group, NodeRole::Model)
}
