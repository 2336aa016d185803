//! Pointing controllers.
//!
//! A controller is a scene node that casts a ray along its local -Z axis and
//! shows it as a line child named `line`. Grabbing an object re-parents it
//! under the controller node, so it follows the controller's pose until it is
//! released. The controller keeps only a lookup handle to what it holds.

use crate::colors;
use crate::math::{Quat, Vec3};
use crate::raycast::Ray;
use crate::scene::{Node, NodeId, Scene, SceneError};

/// Name of the ray line under each controller.
pub const LINE_NAME: &str = "line";

#[derive(Debug, Clone)]
pub struct Controller {
    node: NodeId,
    line: NodeId,
    selected: Option<NodeId>,
}

impl Controller {
    /// Adds a controller node with its ray line under the scene root.
    ///
    /// The line runs from the origin to (0, 0, -1) and is stretched along Z to
    /// `ray_length`.
    pub fn spawn(scene: &mut Scene, name: &str, ray_length: f32) -> Result<Self, SceneError> {
        let node = scene.add_child(scene.root(), Node::group(name))?;
        let line = scene.add_child(
            node,
            Node::line(LINE_NAME, Vec3::ZERO, -Vec3::Z, colors::RAY),
        )?;
        let controller = Self {
            node,
            line,
            selected: None,
        };
        controller.set_line_length(scene, ray_length);
        Ok(controller)
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// What the controller currently holds. The handle may be stale if the
    /// object was removed meanwhile.
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn is_holding(&self) -> bool {
        self.selected.is_some()
    }

    pub(crate) fn set_selected(&mut self, node: NodeId) {
        self.selected = Some(node);
    }

    pub(crate) fn take_selected(&mut self) -> Option<NodeId> {
        self.selected.take()
    }

    /// World-space pointing ray.
    pub fn ray(&self, scene: &Scene) -> Ray {
        Ray::from_pointer(&scene.world_matrix(self.node))
    }

    /// Places the controller at `origin` pointing along `direction`.
    pub fn set_pose(&self, scene: &mut Scene, origin: Vec3, direction: Vec3) {
        if let Some(node) = scene.get_mut(self.node) {
            node.transform
                .set_position(origin)
                .set_rotation(Quat::from_rotation_arc(-Vec3::Z, direction.normalize()));
        }
    }

    /// Points the controller along `ray`.
    pub fn set_pose_from_ray(&self, scene: &mut Scene, ray: &Ray) {
        self.set_pose(scene, ray.origin, ray.direction);
    }

    pub fn set_line_length(&self, scene: &mut Scene, length: f32) {
        if let Some(line) = scene.get_mut(self.line) {
            line.transform.set_scale(Vec3::new(1.0, 1.0, length));
        }
    }

    pub fn set_line_visible(&self, scene: &mut Scene, visible: bool) {
        if let Some(line) = scene.get_mut(self.line) {
            line.visible = visible;
        }
    }

    pub fn line_length(&self, scene: &Scene) -> f32 {
        scene
            .get(self.line)
            .map(|line| line.transform.scale().z)
            .unwrap_or(0.0)
    }

    /// Grabs `object`: it is attached to the controller keeping its world
    /// placement and recorded as the selection.
    pub fn grab(&mut self, scene: &mut Scene, object: NodeId) -> Result<(), SceneError> {
        scene.attach(object, self.node)?;
        self.set_selected(object);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn spawn_adds_named_line() {
        let mut scene = Scene::new();
        let controller = Controller::spawn(&mut scene, "controller", 5.0).unwrap();
        assert!(scene.find_by_name(controller.node(), LINE_NAME).is_some());
        assert_relative_eq!(controller.line_length(&scene), 5.0);
        assert!(!controller.is_holding());
    }

    #[test]
    fn pose_sets_ray() {
        let mut scene = Scene::new();
        let controller = Controller::spawn(&mut scene, "controller", 5.0).unwrap();
        controller.set_pose(&mut scene, Vec3::new(0.0, 1.0, 2.0), Vec3::new(1.0, 0.0, 0.0));

        let ray = controller.ray(&scene);
        assert_eq!(ray.origin, Vec3::new(0.0, 1.0, 2.0));
        assert_relative_eq!(ray.direction.x, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn grabbed_object_follows_controller() {
        let mut scene = Scene::new();
        let mut controller = Controller::spawn(&mut scene, "controller", 5.0).unwrap();
        let root = scene.root();
        let object = scene.add_child(root, Node::group("object")).unwrap();

        controller.grab(&mut scene, object).unwrap();
        assert_eq!(controller.selected(), Some(object));
        assert_eq!(scene.parent(object), Some(controller.node()));

        controller.set_pose(&mut scene, Vec3::new(0.0, 0.0, -3.0), -Vec3::Z);
        assert_relative_eq!(scene.world_matrix(object).translation_part().z, -3.0, epsilon = 1e-5);
        assert_eq!(controller.take_selected(), Some(object));
        assert!(!controller.is_holding());
    }
}
