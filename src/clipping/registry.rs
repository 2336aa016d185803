//! Derivation of clip planes from plane objects.

use log::debug;

use crate::math::{Plane, Vec3};
use crate::scene::{NodeId, Scene};

/// Half-space of a plane object.
///
/// The normal is the object's local +Z axis under its world rotation, taken
/// from the rotations up the parent chain so that negative or zero scale never
/// flips or collapses it. The plane passes through the object's world position.
pub fn plane_of_node(scene: &Scene, node: NodeId) -> Plane {
    let position = scene.world_matrix(node).translation_part();
    let normal = scene.world_rotation(node).rotate(Vec3::Z);
    Plane::from_normal_and_coplanar_point(normal, position)
}

/// World-space center of a node: its geometry's bounding box center for
/// meshes, its origin otherwise.
fn world_center(scene: &Scene, node: NodeId) -> Vec3 {
    let local = scene
        .mesh(node)
        .map(|mesh| mesh.geometry.center())
        .unwrap_or(Vec3::ZERO);
    scene.world_matrix(node).transform_point(local)
}

/// Builds one plane per plane object, in input order.
///
/// Planes are oriented so that the barycenter of the objects' centers lies on
/// their kept side: a plane with the barycenter strictly behind it is negated.
/// This assumes the planes roughly enclose a convex region around that point;
/// other arrangements get no special treatment.
pub fn build_planes(scene: &Scene, plane_objects: &[NodeId]) -> Vec<Plane> {
    if plane_objects.is_empty() {
        return Vec::new();
    }

    let mut planes: Vec<Plane> = plane_objects
        .iter()
        .map(|&node| plane_of_node(scene, node))
        .collect();

    let sum = plane_objects
        .iter()
        .fold(Vec3::ZERO, |acc, &node| acc + world_center(scene, node));
    let barycenter = sum / plane_objects.len() as f32;
    debug!("clip plane barycenter at {barycenter:?}");

    for (index, plane) in planes.iter_mut().enumerate() {
        let distance = plane.distance_to_point(barycenter);
        if distance < 0.0 {
            plane.negate();
            debug!("plane {index} flipped (barycenter distance {distance})");
        }
    }
    planes
}

/// The current ordered set of clip planes.
///
/// Rebuilt from scratch whenever clipping is switched on and emptied when it
/// is switched off.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaneRegistry {
    planes: Vec<Plane>,
}

impl PlaneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, scene: &Scene, plane_objects: &[NodeId]) {
        self.planes = build_planes(scene, plane_objects);
    }

    pub fn clear(&mut self) {
        self.planes.clear();
    }

    /// Flips every plane in place, swapping the kept and the clipped sides.
    pub fn negate_all(&mut self) {
        for plane in &mut self.planes {
            plane.negate();
        }
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Material, Side};
    use crate::mesh::Geometry;
    use crate::scene::{Node, NodeRole};
    use crate::transform::Transform;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;
    use std::rc::Rc;

    fn add_plane(scene: &mut Scene, configure: impl FnOnce(&mut Transform)) -> NodeId {
        let mut transform = Transform::new();
        configure(&mut transform);
        let node = Node::mesh(
            "plane",
            Rc::new(Geometry::plane(2.0, 2.0)),
            Material::standard(0xFF38382F, Side::Double),
        )
        .with_role(NodeRole::ClipPlane)
        .with_transform(transform);
        scene.add_child(scene.root(), node).unwrap()
    }

    #[test]
    fn plane_follows_rotation_not_scale() {
        let mut scene = Scene::new();
        let object = add_plane(&mut scene, |t| {
            t.set_position_xyz(0.0, 2.0, 0.0)
                .rotate_x(-FRAC_PI_2)
                .set_scale(Vec3::new(5.0, 1.0, 0.2));
        });
        let plane = plane_of_node(&scene, object);
        assert_relative_eq!(plane.normal.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(plane.normal.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(plane.constant, -2.0, epsilon = 1e-5);
    }

    #[test]
    fn mirrored_or_collapsed_plane_keeps_its_normal() {
        for scale in [1.0, -1.0, 0.0] {
            let mut scene = Scene::new();
            let object = add_plane(&mut scene, |t| {
                t.set_position_xyz(0.0, 1.0, 0.0)
                    .rotate_y(FRAC_PI_2)
                    .set_scale_uniform(scale);
            });
            let planes = build_planes(&scene, &[object]);
            assert_relative_eq!(planes[0].normal.x, 1.0, epsilon = 1e-5);
            assert_relative_eq!(planes[0].normal.y, 0.0, epsilon = 1e-5);
            assert_relative_eq!(planes[0].normal.z, 0.0, epsilon = 1e-5);
            assert_relative_eq!(planes[0].distance_to_point(Vec3::new(0.0, 1.0, 0.0)), 0.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn scaled_parent_does_not_tilt_child_plane() {
        let mut scene = Scene::new();
        let mut parent_transform = Transform::new();
        parent_transform.set_scale(Vec3::new(-1.0, 2.0, 0.0));
        let parent = scene
            .add_child(scene.root(), Node::group("holder").with_transform(parent_transform))
            .unwrap();
        let object = add_plane(&mut scene, |t| {
            t.rotate_x(-FRAC_PI_2);
        });
        scene.set_parent(object, parent).unwrap();

        let plane = plane_of_node(&scene, object);
        assert_relative_eq!(plane.normal.y, 1.0, epsilon = 1e-5);
        assert_relative_eq!(plane.constant, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn one_plane_per_object_in_order() {
        let mut scene = Scene::new();
        let objects = vec![
            add_plane(&mut scene, |t| {
                t.set_position_xyz(1.0, 0.0, 0.0).rotate_y(FRAC_PI_2);
            }),
            add_plane(&mut scene, |t| {
                t.set_position_xyz(0.0, 1.0, 0.0).rotate_x(-FRAC_PI_2);
            }),
            add_plane(&mut scene, |t| {
                t.set_position_xyz(0.0, 0.0, 1.0);
            }),
        ];

        let planes = build_planes(&scene, &objects);
        assert_eq!(planes.len(), 3);
        for plane in &planes {
            assert_relative_eq!(plane.normal.magnitude(), 1.0, epsilon = 1e-5);
        }
        // The barycenter (1/3, 1/3, 1/3) is behind every raw plane.
        assert_relative_eq!(planes[0].normal.x, -1.0, epsilon = 1e-5);
        assert_relative_eq!(planes[1].normal.y, -1.0, epsilon = 1e-5);
        assert_relative_eq!(planes[2].normal.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn barycenter_is_kept_by_every_plane() {
        let mut scene = Scene::new();
        let objects = vec![
            add_plane(&mut scene, |t| {
                t.set_position_xyz(-1.0, 0.0, 0.0).rotate_y(FRAC_PI_2);
            }),
            add_plane(&mut scene, |t| {
                t.set_position_xyz(1.0, 0.0, 0.0).rotate_y(FRAC_PI_2);
            }),
        ];
        let planes = build_planes(&scene, &objects);
        for plane in &planes {
            assert!(plane.distance_to_point(Vec3::ZERO) >= 0.0);
        }
        assert_relative_eq!(planes[0].normal.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(planes[1].normal.x, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn single_plane_through_its_own_center_is_not_flipped() {
        let mut scene = Scene::new();
        let object = add_plane(&mut scene, |_| {});
        let planes = build_planes(&scene, &[object]);
        assert_eq!(planes, vec![Plane::new(Vec3::Z, 0.0)]);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let mut scene = Scene::new();
        let objects = vec![
            add_plane(&mut scene, |t| {
                t.set_position_xyz(0.3, 1.0, -1.0).rotate_x(0.4).rotate_y(1.1);
            }),
            add_plane(&mut scene, |t| {
                t.set_position_xyz(-0.5, 0.2, 0.7).rotate_z(2.0);
            }),
        ];
        assert_eq!(build_planes(&scene, &objects), build_planes(&scene, &objects));
    }

    #[test]
    fn registry_negates_in_place() {
        let mut scene = Scene::new();
        let object = add_plane(&mut scene, |t| {
            t.set_position_xyz(0.0, 0.0, 2.0);
        });
        let mut registry = PlaneRegistry::new();
        registry.rebuild(&scene, &[object]);
        let original = registry.planes().to_vec();

        registry.negate_all();
        assert_eq!(registry.planes()[0], original[0].negated());
        registry.negate_all();
        assert_eq!(registry.planes(), original.as_slice());

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn no_objects_no_planes() {
        let scene = Scene::new();
        assert!(build_planes(&scene, &[]).is_empty());
    }
}
