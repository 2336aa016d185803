//! Unit quaternions for object orientation.
//!
//! Orientation lives in [`Transform`](crate::transform::Transform) as a
//! quaternion so that re-parenting an object (see [`Scene::attach`](crate::scene::Scene::attach))
//! can decompose an arbitrary world matrix back into position, rotation and scale.

use std::ops::Mul;

use super::mat4::Mat4;
use super::vec3::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around `axis` (counter-clockwise when looking
    /// down the axis towards the origin).
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalize();
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    pub fn from_rotation_x(angle: f32) -> Self {
        Self::from_axis_angle(Vec3::X, angle)
    }

    pub fn from_rotation_y(angle: f32) -> Self {
        Self::from_axis_angle(Vec3::Y, angle)
    }

    pub fn from_rotation_z(angle: f32) -> Self {
        Self::from_axis_angle(Vec3::Z, angle)
    }

    /// Shortest rotation turning unit vector `from` onto unit vector `to`.
    pub fn from_rotation_arc(from: Vec3, to: Vec3) -> Self {
        let d = from.dot(to);
        if d < -1.0 + 1e-6 {
            // Opposite vectors: half turn around any perpendicular axis.
            let axis = from.any_orthogonal();
            return Self::new(axis.x, axis.y, axis.z, 0.0);
        }
        let c = from.cross(to);
        Self::new(c.x, c.y, c.z, 1.0 + d).normalize()
    }

    /// Extracts the rotation from the upper 3x3 block of a pure rotation matrix.
    pub fn from_rotation_matrix(m: &Mat4) -> Self {
        let (m00, m01, m02) = (m.get(0, 0), m.get(0, 1), m.get(0, 2));
        let (m10, m11, m12) = (m.get(1, 0), m.get(1, 1), m.get(1, 2));
        let (m20, m21, m22) = (m.get(2, 0), m.get(2, 1), m.get(2, 2));
        let trace = m00 + m11 + m22;

        let q = if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self::new((m21 - m12) * s, (m02 - m20) * s, (m10 - m01) * s, 0.25 / s)
        } else if m00 > m11 && m00 > m22 {
            let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt();
            Self::new(0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s)
        } else if m11 > m22 {
            let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt();
            Self::new((m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s)
        } else {
            let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt();
            Self::new((m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s)
        };
        q.normalize()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            return Self::IDENTITY;
        }
        Self::new(self.x / len, self.y / len, self.z / len, self.w / len)
    }

    /// Rotates a vector by this quaternion.
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let t = u.cross(v) * 2.0;
        v + t * self.w + u.cross(t)
    }

    /// Rotation matrix with zero translation.
    pub fn to_mat4(&self) -> Mat4 {
        let Self { x, y, z, w } = *self;
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (wx, wy, wz) = (w * x, w * y, w * z);
        Mat4::new([
            [1.0 - 2.0 * (yy + zz), 2.0 * (xy - wz), 2.0 * (xz + wy), 0.0],
            [2.0 * (xy + wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz - wx), 0.0],
            [2.0 * (xz - wy), 2.0 * (yz + wx), 1.0 - 2.0 * (xx + yy), 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }
}

/// Hamilton product: `a * b` applies `b` first, then `a`.
impl Mul<Quat> for Quat {
    type Output = Quat;

    fn mul(self, rhs: Quat) -> Self::Output {
        Quat::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-5);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-5);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-5);
    }

    #[test]
    fn quarter_turn_around_y_maps_z_to_x() {
        let q = Quat::from_rotation_y(FRAC_PI_2);
        assert_vec_eq(q.rotate(Vec3::Z), Vec3::X);
    }

    #[test]
    fn matrix_and_quaternion_rotate_alike() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 2.0, -0.5), 0.7);
        let v = Vec3::new(0.3, -1.0, 2.0);
        assert_vec_eq(q.to_mat4().transform_vector(v), q.rotate(v));
    }

    #[test]
    fn matrix_round_trip_preserves_rotation() {
        for q in [
            Quat::from_rotation_x(2.5),
            Quat::from_rotation_y(-3.0),
            Quat::from_axis_angle(Vec3::new(1.0, 1.0, 1.0), 1.9),
        ] {
            let back = Quat::from_rotation_matrix(&q.to_mat4());
            let v = Vec3::new(1.0, 2.0, 3.0);
            assert_vec_eq(back.rotate(v), q.rotate(v));
        }
    }

    #[test]
    fn rotation_arc_handles_opposite_vectors() {
        let q = Quat::from_rotation_arc(Vec3::Z, -Vec3::Z);
        assert_vec_eq(q.rotate(Vec3::Z), -Vec3::Z);
    }

    #[test]
    fn product_applies_right_operand_first() {
        let a = Quat::from_rotation_x(FRAC_PI_2);
        let b = Quat::from_rotation_y(FRAC_PI_2);
        let v = Vec3::Z;
        assert_vec_eq((a * b).rotate(v), a.rotate(b.rotate(v)));
    }
}
