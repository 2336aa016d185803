//! Fragment shaders for triangle rasterization.
//!
//! Similar to how GPUs separate the fixed-function rasterizer from
//! programmable fragment shaders, the rasterizer here handles coverage and
//! interpolation while the shader decides each fragment's color, or discards
//! it.

use crate::material::Material;
use crate::math::Vec3;

/// Trait for per-fragment shading computations.
///
/// The rasterizer calls `shade()` for each covered pixel with the
/// perspective-correct world position of the fragment.
pub trait FragmentShader {
    /// Color of the fragment at `world`, or `None` to discard it.
    fn shade(&self, world: Vec3) -> Option<u32>;
}

/// Flat shader - returns a constant color for all pixels.
///
/// The color is computed once per triangle from the face normal.
pub struct FlatShader {
    color: u32,
}

impl FlatShader {
    pub fn new(color: u32) -> Self {
        Self { color }
    }
}

impl FragmentShader for FlatShader {
    #[inline]
    fn shade(&self, _world: Vec3) -> Option<u32> {
        Some(self.color)
    }
}

/// Flat shader that discards fragments cut away by the material's clipping
/// planes.
pub struct ClippedFlatShader<'a> {
    color: u32,
    material: &'a Material,
}

impl<'a> ClippedFlatShader<'a> {
    pub fn new(color: u32, material: &'a Material) -> Self {
        Self { color, material }
    }
}

impl FragmentShader for ClippedFlatShader<'_> {
    #[inline]
    fn shade(&self, world: Vec3) -> Option<u32> {
        self.material.is_visible_at(world).then_some(self.color)
    }
}
