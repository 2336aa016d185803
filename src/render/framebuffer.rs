//! Borrowed view over the render targets and the per-fragment pipeline.
//!
//! A fragment runs the same tests a GPU would: stencil test, depth test, the
//! stencil update picked by the depth result, then the depth and color
//! writes. Depth is stored as 1/w, so larger is closer and 0.0 is the far
//! clear value.

use crate::material::{Material, StencilState};

/// How one draw call's fragments interact with the buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentState {
    pub stencil: StencilState,
    pub depth_test: bool,
    pub depth_write: bool,
    pub color_write: bool,
}

impl Default for FragmentState {
    /// Opaque geometry: depth tested and written, no stencil.
    fn default() -> Self {
        Self {
            stencil: StencilState::default(),
            depth_test: true,
            depth_write: true,
            color_write: true,
        }
    }
}

impl From<&Material> for FragmentState {
    fn from(material: &Material) -> Self {
        Self {
            stencil: material.stencil,
            depth_test: material.depth_test,
            depth_write: material.depth_write,
            color_write: material.color_write,
        }
    }
}

/// Color, depth and stencil planes of one frame, all `width * height` long.
pub struct FrameBuffer<'a> {
    color: &'a mut [u32],
    depth: &'a mut [f32],
    stencil: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    pub fn new(
        color: &'a mut [u32],
        depth: &'a mut [f32],
        stencil: &'a mut [u8],
        width: u32,
        height: u32,
    ) -> Self {
        let len = (width * height) as usize;
        debug_assert!(
            color.len() == len && depth.len() == len && stencil.len() == len,
            "buffer lengths do not match {width}x{height}"
        );
        Self {
            color,
            depth,
            stencil,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Runs pixel (x, y) through the tests and performs the writes `state`
    /// allows. `depth` is 1/w. Returns whether the fragment survived.
    #[inline]
    pub fn write_fragment(
        &mut self,
        x: i32,
        y: i32,
        depth: f32,
        color: u32,
        state: &FragmentState,
    ) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };

        let stencil = state.stencil;
        if stencil.write {
            let stored = self.stencil[i];
            if !stencil.func.test(stencil.reference, stored) {
                self.stencil[i] = stencil.fail.apply(stored, stencil.reference);
                return false;
            }
        }

        // Ties pass, so coplanar passes over the same surface all draw
        let depth_pass = !state.depth_test || depth >= self.depth[i];

        if stencil.write {
            let op = if depth_pass { stencil.z_pass } else { stencil.z_fail };
            self.stencil[i] = op.apply(self.stencil[i], stencil.reference);
        }
        if !depth_pass {
            return false;
        }

        if state.depth_write {
            self.depth[i] = depth;
        }
        if state.color_write {
            self.color[i] = color;
        }
        true
    }

    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|i| self.color[i])
    }

    /// Bresenham line between two (x, y, 1/w) endpoints. Every pixel is a
    /// regular fragment, with 1/w interpolated along the major axis.
    pub fn draw_line(
        &mut self,
        (x0, y0, inv_w0): (i32, i32, f32),
        (x1, y1, inv_w1): (i32, i32, f32),
        color: u32,
        state: &FragmentState,
    ) {
        let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
        let (sx, sy) = ((x1 - x0).signum(), (y1 - y0).signum());
        let steps = dx.max(-dy).max(1) as f32;

        let (mut x, mut y) = (x0, y0);
        let mut err = dx + dy;
        for step in 0.. {
            let t = step as f32 / steps;
            self.write_fragment(x, y, inv_w0 + (inv_w1 - inv_w0) * t, color, state);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}
