//! The render targets the engine owns between frames.

use super::framebuffer::FrameBuffer;
use crate::colors;

pub struct Renderer {
    color: Vec<u32>,
    /// 1/w per pixel; 0.0 is infinitely far.
    depth: Vec<f32>,
    stencil: Vec<u8>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width * height) as usize;
        Self {
            color: vec![colors::BACKGROUND; len],
            depth: vec![0.0; len],
            stencil: vec![0; len],
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: u32) {
        self.color.fill(color);
    }

    #[inline]
    pub fn clear_depth(&mut self) {
        self.depth.fill(0.0);
    }

    #[inline]
    pub fn clear_stencil(&mut self) {
        self.stencil.fill(0);
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|i| self.color[i])
    }

    pub fn stencil(&self, x: u32, y: u32) -> Option<u8> {
        self.index(x, y).map(|i| self.stencil[i])
    }

    /// The color buffer as ARGB8888 bytes, ready for a streaming texture.
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: u32 has no padding and u8 has alignment 1, so the slice
        // covers exactly the color buffer's memory.
        unsafe {
            std::slice::from_raw_parts(
                self.color.as_ptr() as *const u8,
                self.color.len() * 4,
            )
        }
    }

    /// The color buffer as tightly packed RGBA8 rows.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.color
            .iter()
            .flat_map(|&color| colors::to_rgba(color))
            .collect()
    }

    pub fn as_framebuffer(&mut self) -> FrameBuffer<'_> {
        FrameBuffer::new(
            &mut self.color,
            &mut self.depth,
            &mut self.stencil,
            self.width,
            self.height,
        )
    }
}
