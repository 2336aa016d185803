//! Triangle rasterization.
//!
//! [`EdgeFunctionRasterizer`] covers pixels with edge functions and hands
//! each one to a [`FragmentShader`].

mod edgefunction;
pub mod shader;

pub use edgefunction::EdgeFunctionRasterizer;
pub use shader::{ClippedFlatShader, FlatShader, FragmentShader};

use crate::math::Vec3;

/// A triangle corner ready for rasterization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenVertex {
    /// Pixel x, pixel y and 1/w.
    pub position: Vec3,
    /// World-space position, interpolated for clip-plane tests.
    pub world: Vec3,
}
