//! Arena-backed scene graph.
//!
//! Nodes live in a slot arena and refer to each other through generational
//! [`NodeId`]s, so a removed node can never be reached through a stale id.
//! Every node has at most one parent; re-parenting with [`Scene::attach`]
//! moves ownership of a subtree while keeping its world placement, which is
//! how controllers grab and release objects.

mod node;

pub use node::{LineData, MeshData, Node, NodeKind, NodeRole};

use log::warn;
use thiserror::Error;

use crate::math::{Mat4, Quat};
use crate::transform::Transform;

/// Handle to a node in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("node {0:?} no longer exists")]
    Stale(NodeId),
    #[error("cannot parent node {child:?} under its own descendant {parent:?}")]
    Cycle { child: NodeId, parent: NodeId },
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug)]
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates a scene with an empty root group named `scene`.
    pub fn new() -> Self {
        let mut scene = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        };
        scene.root = scene.insert(Node::group("scene"));
        scene
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, including the root.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    pub fn mesh(&self, id: NodeId) -> Option<&MeshData> {
        self.get(id).and_then(Node::as_mesh)
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut MeshData> {
        self.get_mut(id).and_then(Node::as_mesh_mut)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Inserts `node` as the last child of `parent`, keeping its local transform.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::Stale(parent));
        }
        let id = self.insert(node);
        self.link(id, parent);
        Ok(id)
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    fn unlink(&mut self, id: NodeId) {
        if let Some(parent) = self.get_mut(id).and_then(|node| node.parent.take()) {
            if let Some(parent) = self.get_mut(parent) {
                parent.children.retain(|&child| child != id);
            }
        }
    }

    fn link(&mut self, id: NodeId, parent: NodeId) {
        self.unlink(id);
        if let Some(node) = self.get_mut(id) {
            node.parent = Some(parent);
        }
        if let Some(parent) = self.get_mut(parent) {
            parent.children.push(id);
        }
    }

    fn check_reparent(&self, child: NodeId, parent: NodeId) -> Result<(), SceneError> {
        if !self.contains(child) {
            return Err(SceneError::Stale(child));
        }
        if !self.contains(parent) {
            return Err(SceneError::Stale(parent));
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { child, parent });
        }
        Ok(())
    }

    /// Moves `child` under `parent` keeping its *local* transform, so its
    /// world placement follows the new parent.
    pub fn set_parent(&mut self, child: NodeId, parent: NodeId) -> Result<(), SceneError> {
        self.check_reparent(child, parent)?;
        self.link(child, parent);
        Ok(())
    }

    /// Moves `child` under `parent` keeping its *world* placement.
    ///
    /// The new local transform is `inverse(parent_world) * child_world`. A
    /// parent with a singular world matrix (zero scale) cannot be inverted; the
    /// child then keeps its world matrix as its local one.
    pub fn attach(&mut self, child: NodeId, parent: NodeId) -> Result<(), SceneError> {
        self.check_reparent(child, parent)?;

        let child_world = self.world_matrix(child);
        let parent_world = self.world_matrix(parent);
        let local = match parent_world.inverse() {
            Some(inverse) => inverse * child_world,
            None => {
                warn!("attach: parent {parent:?} has a singular transform");
                child_world
            }
        };

        self.link(child, parent);
        if let Some(node) = self.get_mut(child) {
            node.transform = Transform::from_matrix(&local);
        }
        Ok(())
    }

    /// Removes a node and all its descendants. Returns how many nodes were freed.
    ///
    /// The root cannot be removed; removing it clears its children instead.
    pub fn remove_subtree(&mut self, id: NodeId) -> usize {
        if id == self.root {
            let children = self.children(id).to_vec();
            return children.into_iter().map(|c| self.remove_subtree(c)).sum();
        }
        if !self.contains(id) {
            return 0;
        }
        self.unlink(id);

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                removed += 1;
            }
        }
        removed
    }

    /// Local-to-world matrix of a node (identity for stale ids).
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::identity();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else {
                break;
            };
            matrix = node.transform.to_matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// Orientation of a node in world space, composed from the local
    /// rotations up the parent chain. Scale, including negative and zero
    /// scale, never enters it.
    pub fn world_rotation(&self, id: NodeId) -> Quat {
        let mut rotation = Quat::IDENTITY;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.get(node_id) else {
                break;
            };
            rotation = node.transform.rotation() * rotation;
            current = node.parent;
        }
        rotation.normalize()
    }

    /// World placement of a node decomposed into a [`Transform`].
    pub fn world_transform(&self, id: NodeId) -> Transform {
        Transform::from_matrix(&self.world_matrix(id))
    }

    /// Whether the node and all its ancestors are visible.
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.get(node_id) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Pre-order traversal of `id` and its descendants.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get(current) {
                order.push(current);
                stack.extend(node.children.iter().rev());
            }
        }
        order
    }

    /// First node named `name` in a pre-order walk from `id`.
    pub fn find_by_name(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|&node| self.get(node).is_some_and(|n| n.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn group_at(scene: &mut Scene, parent: NodeId, name: &str, position: Vec3) -> NodeId {
        let mut transform = Transform::new();
        transform.set_position(position);
        scene
            .add_child(parent, Node::group(name).with_transform(transform))
            .unwrap()
    }

    #[test]
    fn world_matrix_chains_parents() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = group_at(&mut scene, root, "a", Vec3::new(1.0, 0.0, 0.0));
        let b = group_at(&mut scene, a, "b", Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(scene.world_matrix(b).translation_part(), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn world_rotation_ignores_scale() {
        let mut scene = Scene::new();
        let root = scene.root();
        let parent = group_at(&mut scene, root, "parent", Vec3::ZERO);
        let child = group_at(&mut scene, parent, "child", Vec3::new(0.0, 1.0, 0.0));
        scene.get_mut(parent).unwrap().transform.rotate_y(FRAC_PI_2);
        scene.get_mut(child).unwrap().transform.rotate_x(FRAC_PI_2);

        for scale in [1.0, -1.0, 0.0] {
            scene.get_mut(parent).unwrap().transform.set_scale_uniform(scale);
            scene.get_mut(child).unwrap().transform.set_scale_uniform(scale);
            let expected = Quat::from_rotation_y(FRAC_PI_2) * Quat::from_rotation_x(FRAC_PI_2);
            let z = scene.world_rotation(child).rotate(Vec3::Z);
            let want = expected.rotate(Vec3::Z);
            assert_relative_eq!(z.x, want.x, epsilon = 1e-5);
            assert_relative_eq!(z.y, want.y, epsilon = 1e-5);
            assert_relative_eq!(z.z, want.z, epsilon = 1e-5);
        }
    }

    #[test]
    fn attach_preserves_world_placement() {
        let mut scene = Scene::new();
        let root = scene.root();
        let holder = group_at(&mut scene, root, "holder", Vec3::new(0.0, 1.0, 0.0));
        scene
            .get_mut(holder)
            .unwrap()
            .transform
            .set_rotation(Quat::from_rotation_y(0.7))
            .set_scale_uniform(2.0);
        let object = group_at(&mut scene, root, "object", Vec3::new(3.0, 0.5, -1.0));

        scene.attach(object, holder).unwrap();
        assert_eq!(scene.parent(object), Some(holder));
        let world = scene.world_matrix(object).translation_part();
        assert_relative_eq!(world.x, 3.0, epsilon = 1e-4);
        assert_relative_eq!(world.y, 0.5, epsilon = 1e-4);
        assert_relative_eq!(world.z, -1.0, epsilon = 1e-4);

        // Moving the holder now drags the object along.
        scene.get_mut(holder).unwrap().transform.translate(Vec3::new(0.0, 0.0, 5.0));
        assert_relative_eq!(scene.world_matrix(object).translation_part().z, 4.0, epsilon = 1e-4);

        scene.attach(object, root).unwrap();
        assert_relative_eq!(scene.get(object).unwrap().transform.position().z, 4.0, epsilon = 1e-4);
        assert!(scene.children(holder).is_empty());
    }

    #[test]
    fn set_parent_keeps_the_local_transform() {
        let mut scene = Scene::new();
        let root = scene.root();
        let holder = group_at(&mut scene, root, "holder", Vec3::new(0.0, 1.0, 0.0));
        let object = group_at(&mut scene, root, "object", Vec3::new(2.0, 0.0, 0.0));

        scene.set_parent(object, holder).unwrap();
        assert_eq!(scene.children(holder), [object]);
        assert_eq!(scene.get(object).unwrap().transform.position(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(scene.world_matrix(object).translation_part(), Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn attach_rejects_cycles() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = group_at(&mut scene, root, "a", Vec3::ZERO);
        let b = group_at(&mut scene, a, "b", Vec3::ZERO);
        assert_eq!(scene.attach(a, b), Err(SceneError::Cycle { child: a, parent: b }));
    }

    #[test]
    fn removed_ids_go_stale() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = group_at(&mut scene, root, "a", Vec3::ZERO);
        let b = group_at(&mut scene, a, "b", Vec3::ZERO);
        assert_eq!(scene.remove_subtree(a), 2);
        assert!(!scene.contains(a));
        assert!(!scene.contains(b));
        assert!(scene.children(root).is_empty());

        // The slot is reused but the old id stays dead.
        let c = group_at(&mut scene, root, "c", Vec3::ZERO);
        assert!(scene.contains(c));
        assert!(scene.get(a).is_none());
        assert!(scene.get(b).is_none());
    }

    #[test]
    fn hidden_parent_hides_children() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = group_at(&mut scene, root, "a", Vec3::ZERO);
        let b = group_at(&mut scene, a, "b", Vec3::ZERO);
        scene.get_mut(a).unwrap().visible = false;
        assert!(!scene.is_visible(b));
    }

    #[test]
    fn find_by_name_walks_depth_first() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = group_at(&mut scene, root, "a", Vec3::ZERO);
        let line = group_at(&mut scene, a, "line", Vec3::ZERO);
        assert_eq!(scene.find_by_name(root, "line"), Some(line));
        assert_eq!(scene.find_by_name(root, "missing"), None);
    }
}
