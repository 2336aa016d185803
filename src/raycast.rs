//! Picking rays against scene meshes.

use std::cmp::Ordering;

use crate::math::{Mat4, Vec3};
use crate::scene::{NodeId, Scene};

const EPSILON: f32 = 1e-7;

/// A half-line in world space. `direction` is unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray along the local -Z axis of a node with the given world matrix.
    ///
    /// Only the rotation of the matrix is used for the direction, so a scaled
    /// controller still casts a unit ray.
    pub fn from_pointer(world: &Mat4) -> Self {
        let forward = world.transform_vector(-Vec3::Z);
        Self::new(world.translation_part(), forward)
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Distance along the ray to a triangle, both faces counted.
    ///
    /// Möller–Trumbore; returns `None` for misses, parallel rays and hits
    /// behind the origin.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let h = self.direction.cross(edge2);
        let det = edge1.dot(h);
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = inv_det * self.direction.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * edge2.dot(q);
        (t > EPSILON).then_some(t)
    }
}

/// Nearest hit of a ray on one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub node: NodeId,
    pub distance: f32,
    pub point: Vec3,
}

/// Closest intersection of `ray` with the triangles of a mesh node.
pub fn intersect_node(scene: &Scene, node: NodeId, ray: &Ray) -> Option<Intersection> {
    let mesh = scene.mesh(node)?;
    let world = scene.world_matrix(node);

    mesh.geometry
        .triangles()
        .filter_map(|[a, b, c]| {
            ray.intersect_triangle(
                world.transform_point(a),
                world.transform_point(b),
                world.transform_point(c),
            )
        })
        .min_by(|x, y| x.partial_cmp(y).unwrap_or(Ordering::Equal))
        .map(|distance| Intersection {
            node,
            distance,
            point: ray.at(distance),
        })
}

/// Intersects the listed nodes (not their descendants), nearest first.
///
/// Hidden nodes and non-mesh nodes are skipped.
pub fn intersect_objects(scene: &Scene, nodes: &[NodeId], ray: &Ray) -> Vec<Intersection> {
    let mut hits: Vec<Intersection> = nodes
        .iter()
        .filter(|&&node| scene.is_visible(node))
        .filter_map(|&node| intersect_node(scene, node, ray))
        .collect();
    hits.sort_by(|x, y| x.distance.partial_cmp(&y.distance).unwrap_or(Ordering::Equal));
    hits
}
