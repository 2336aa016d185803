//! Half-space triangle rasterization.
//!
//! A pixel center `P` is inside a triangle when its three edge values
//!
//! ```text
//! E_ab(P) = (P.x - A.x) * (B.y - A.y) - (P.y - A.y) * (B.x - A.x)
//! ```
//!
//! have the sign of the triangle's area. Divided by that area they are the
//! barycentric weights of `P`.
//!
//! Centers lying exactly on an edge go to one of the two triangles sharing
//! it, never both and never neither. Stencil counting depends on this: a
//! surface that covers a pixel twice flips its inside/outside parity.
//!
//! See Pineda, "A Parallel Algorithm for Polygon Rasterization" (1988).

use super::shader::FragmentShader;
use super::ScreenVertex;
use crate::math::Vec3;
use crate::render::framebuffer::{FragmentState, FrameBuffer};

/// Walks a triangle's screen bounding box and shades the covered pixels,
/// handing the shader a perspective-correct world position.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeFunctionRasterizer;

impl EdgeFunctionRasterizer {
    pub fn new() -> Self {
        EdgeFunctionRasterizer
    }

    #[inline]
    fn edge_function(a: Vec3, b: Vec3, p: Vec3) -> f32 {
        (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
    }

    /// Whether pixels lying exactly on edge (A -> B) are owned by this
    /// triangle. Antisymmetric, so a shared edge has exactly one owner.
    #[inline]
    fn owns_edge(a: Vec3, b: Vec3) -> bool {
        let dy = b.y - a.y;
        dy > 0.0 || (dy == 0.0 && b.x < a.x)
    }

    /// Runs `shader` for every covered pixel and writes the surviving
    /// fragments through `state`.
    pub fn fill_triangle<S: FragmentShader>(
        &self,
        vertices: &[ScreenVertex; 3],
        buffer: &mut FrameBuffer,
        state: &FragmentState,
        shader: &S,
    ) {
        // ─────────────────────────────────────────────────────────────────────
        // Winding: make interior edge values positive
        // ─────────────────────────────────────────────────────────────────────
        let [v0, mut v1, mut v2] = *vertices;
        let mut area = Self::edge_function(v0.position, v1.position, v2.position);
        if area.abs() < f32::EPSILON {
            return; // Degenerate triangle
        }
        if area < 0.0 {
            std::mem::swap(&mut v1, &mut v2);
            area = -area;
        }
        let inv_area = 1.0 / area;
        let (p0, p1, p2) = (v0.position, v1.position, v2.position);

        // ─────────────────────────────────────────────────────────────────────
        // Bounding box, clipped to the buffer
        // ─────────────────────────────────────────────────────────────────────
        let min_x = (p0.x.min(p1.x).min(p2.x).floor() as i32).max(0);
        let max_x = (p0.x.max(p1.x).max(p2.x).ceil() as i32).min(buffer.width() as i32 - 1);
        let min_y = (p0.y.min(p1.y).min(p2.y).floor() as i32).max(0);
        let max_y = (p0.y.max(p1.y).max(p2.y).ceil() as i32).min(buffer.height() as i32 - 1);

        let owns = [
            Self::owns_edge(p1, p2),
            Self::owns_edge(p2, p0),
            Self::owns_edge(p0, p1),
        ];

        // Attributes divided by w interpolate linearly in screen space
        let world_over_w = [
            v0.world * v0.position.z,
            v1.world * v1.position.z,
            v2.world * v2.position.z,
        ];

        // ─────────────────────────────────────────────────────────────────────
        // Coverage and shading
        // ─────────────────────────────────────────────────────────────────────
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec3::new(x as f32 + 0.5, y as f32 + 0.5, 0.0);

                let w = [
                    Self::edge_function(p1, p2, p),
                    Self::edge_function(p2, p0, p),
                    Self::edge_function(p0, p1, p),
                ];
                let inside = w
                    .iter()
                    .zip(owns)
                    .all(|(&e, owned)| e > 0.0 || (e == 0.0 && owned));
                if !inside {
                    continue;
                }

                let lambda = [w[0] * inv_area, w[1] * inv_area, w[2] * inv_area];
                let inv_w = lambda[0] * p0.z + lambda[1] * p1.z + lambda[2] * p2.z;
                if inv_w <= 0.0 {
                    continue;
                }
                let world = (world_over_w[0] * lambda[0]
                    + world_over_w[1] * lambda[1]
                    + world_over_w[2] * lambda[2])
                    / inv_w;

                if let Some(color) = shader.shade(world) {
                    buffer.write_fragment(x, y, inv_w, color, state);
                }
            }
        }
    }
}
