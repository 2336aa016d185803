//! Oriented planes used as clipping half-spaces.

use super::vec3::Vec3;

/// A plane `normal · p + constant = 0`.
///
/// Points with a negative [`distance_to_point`](Plane::distance_to_point) lie
/// on the clipped side; everything on or in front of the plane is kept.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub constant: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self::new(Vec3::Y, 0.0)
    }
}

impl Plane {
    pub const fn new(normal: Vec3, constant: f32) -> Self {
        Self { normal, constant }
    }

    /// Plane with the given normal passing through `point`.
    ///
    /// The normal is normalized first so the plane stays a unit plane.
    pub fn from_normal_and_coplanar_point(normal: Vec3, point: Vec3) -> Self {
        let normal = normal.normalize();
        Self::new(normal, -point.dot(normal))
    }

    /// Signed distance; positive in front of the plane.
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.constant
    }

    /// Flips which half-space is kept.
    pub fn negate(&mut self) -> &mut Self {
        self.normal = -self.normal;
        self.constant = -self.constant;
        self
    }

    pub fn negated(&self) -> Self {
        let mut plane = *self;
        plane.negate();
        plane
    }

    /// The point of the plane closest to the origin.
    pub fn coplanar_point(&self) -> Vec3 {
        self.normal * -self.constant
    }
}
