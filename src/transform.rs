//! Position, orientation and scale of a scene node relative to its parent.

use crate::math::{Mat4, Quat, Vec3};

/// Setters return `&mut Self`, so a plane object can be posed in one chain:
///
/// ```ignore
/// node.transform
///     .set_position_xyz(1.0, 1.0, -1.0)
///     .rotate_x(-std::f32::consts::FRAC_PI_2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// The identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits an affine matrix into a transform. Shear is dropped.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (position, rotation, scale) = matrix.decompose();
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) -> &mut Self {
        self.position = position;
        self
    }

    pub fn set_position_xyz(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        self.position += offset;
        self
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Quat) -> &mut Self {
        self.rotation = rotation.normalize();
        self
    }

    /// Rotate around the local X axis.
    pub fn rotate_x(&mut self, angle: f32) -> &mut Self {
        self.set_rotation(self.rotation * Quat::from_rotation_x(angle))
    }

    /// Rotate around the local Y axis.
    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        self.set_rotation(self.rotation * Quat::from_rotation_y(angle))
    }

    /// Rotate around the local Z axis.
    pub fn rotate_z(&mut self, angle: f32) -> &mut Self {
        self.set_rotation(self.rotation * Quat::from_rotation_z(angle))
    }

    /// Turns the local +Z axis towards `target` (given in the parent's space).
    pub fn look_at(&mut self, target: Vec3) -> &mut Self {
        let direction = (target - self.position).normalize();
        if direction == Vec3::ZERO {
            return self;
        }
        self.set_rotation(Quat::from_rotation_arc(Vec3::Z, direction))
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) -> &mut Self {
        self.scale = scale;
        self
    }

    pub fn set_scale_uniform(&mut self, factor: f32) -> &mut Self {
        self.scale = Vec3::splat(factor);
        self
    }

    /// Local-to-parent matrix: scale, then rotate, then translate.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::compose(self.position, self.rotation, self.scale)
    }
}
