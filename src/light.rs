//! Flat-shading light rig: an ambient term plus distant directional lights.

use crate::math::Vec3;

/// Parallel light travelling along `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Unit vector the light travels along.
    pub direction: Vec3,
    pub intensity: f32,
}

impl DirectionalLight {
    pub fn new(direction: Vec3) -> Self {
        DirectionalLight {
            direction: direction.normalize(),
            intensity: 1.0,
        }
    }

    /// A light placed at `position` shining towards the origin.
    pub fn from_position(position: Vec3) -> Self {
        Self::new(-position)
    }

    /// Lambert term for a surface normal, in [0, intensity].
    pub fn diffuse(&self, normal: Vec3) -> f32 {
        normal.normalize().dot(-self.direction).max(0.0) * self.intensity
    }
}

/// Ambient term plus a set of directional lights.
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub lights: Vec<DirectionalLight>,
}

impl Default for Lighting {
    /// Soft ambient light and two lights from the upper left-back and upper
    /// right-front.
    fn default() -> Self {
        Self {
            ambient: 0.5,
            lights: vec![
                DirectionalLight::from_position(Vec3::new(-5.0, 3.0, -1.0)),
                DirectionalLight::from_position(Vec3::new(5.0, 3.0, 1.0)),
            ],
        }
    }
}

impl Lighting {
    /// Total light intensity on a surface with the given normal.
    ///
    /// Not clamped; colors saturate when they are packed.
    pub fn intensity(&self, normal: Vec3) -> f32 {
        self.ambient
            + self
                .lights
                .iter()
                .map(|light| light.diffuse(normal))
                .sum::<f32>()
    }
}
