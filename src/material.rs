//! Surface and per-fragment state of a mesh.
//!
//! A [`Material`] carries everything the rasterizer needs to decide whether a
//! fragment survives: which faces are drawn, the clip planes, the stencil
//! test and the depth/color write masks.

use crate::colors;
use crate::math::{Plane, Vec3};

/// Which triangle faces are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Comparison between the reference value and the stored stencil value.
///
/// The test passes when `reference <op> stored` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StencilFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    #[default]
    Always,
}

impl StencilFunc {
    #[inline]
    pub fn test(self, reference: u8, stored: u8) -> bool {
        match self {
            StencilFunc::Never => false,
            StencilFunc::Less => reference < stored,
            StencilFunc::Equal => reference == stored,
            StencilFunc::LessEqual => reference <= stored,
            StencilFunc::Greater => reference > stored,
            StencilFunc::NotEqual => reference != stored,
            StencilFunc::GreaterEqual => reference >= stored,
            StencilFunc::Always => true,
        }
    }
}

/// Update applied to the stored stencil value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StencilOp {
    #[default]
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    IncrementWrap,
    DecrementWrap,
    Invert,
}

impl StencilOp {
    #[inline]
    pub fn apply(self, stored: u8, reference: u8) -> u8 {
        match self {
            StencilOp::Keep => stored,
            StencilOp::Zero => 0,
            StencilOp::Replace => reference,
            StencilOp::Increment => stored.saturating_add(1),
            StencilOp::Decrement => stored.saturating_sub(1),
            StencilOp::IncrementWrap => stored.wrapping_add(1),
            StencilOp::DecrementWrap => stored.wrapping_sub(1),
            StencilOp::Invert => !stored,
        }
    }
}

/// Stencil configuration of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StencilState {
    /// When false the stencil buffer is neither tested nor written.
    pub write: bool,
    pub func: StencilFunc,
    pub reference: u8,
    /// Applied when the stencil test fails.
    pub fail: StencilOp,
    /// Applied when the stencil test passes but the depth test fails.
    pub z_fail: StencilOp,
    /// Applied when both tests pass.
    pub z_pass: StencilOp,
}

impl StencilState {
    /// Same operation for all three outcomes.
    pub fn with_ops(func: StencilFunc, reference: u8, op: StencilOp) -> Self {
        Self {
            write: true,
            func,
            reference,
            fail: op,
            z_fail: op,
            z_pass: op,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: u32,
    /// Added on top of the lit color; red marks hover, blue marks selection.
    pub emissive: Vec3,
    pub side: Side,
    /// Half-spaces this material is clipped against.
    pub clipping_planes: Vec<Plane>,
    /// false: a fragment behind *any* plane is discarded (the kept region is
    /// the intersection of the kept half-spaces).
    /// true: a fragment is discarded only when it is behind *all* planes.
    pub clip_intersection: bool,
    pub stencil: StencilState,
    pub depth_test: bool,
    pub depth_write: bool,
    pub color_write: bool,
    /// Lit by the scene lights; unlit materials use `color` as is.
    pub lit: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: colors::MODEL,
            emissive: Vec3::ZERO,
            side: Side::Front,
            clipping_planes: Vec::new(),
            clip_intersection: false,
            stencil: StencilState::default(),
            depth_test: true,
            depth_write: true,
            color_write: true,
            lit: true,
        }
    }
}

impl Material {
    /// Lit, depth tested material.
    pub fn standard(color: u32, side: Side) -> Self {
        Self {
            color,
            side,
            ..Self::default()
        }
    }

    /// Unlit material; used for lines and flat overlays.
    pub fn basic(color: u32) -> Self {
        Self {
            color,
            lit: false,
            ..Self::default()
        }
    }

    /// Whether a world-space point survives the clip planes.
    pub fn is_visible_at(&self, point: Vec3) -> bool {
        if self.clipping_planes.is_empty() {
            return true;
        }
        let mut behind = self
            .clipping_planes
            .iter()
            .map(|plane| plane.distance_to_point(point) < 0.0);
        if self.clip_intersection {
            !behind.all(|b| b)
        } else {
            !behind.any(|b| b)
        }
    }
}
