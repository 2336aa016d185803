//! Sutherland-Hodgman clipping against the homogeneous view volume
//! `-w <= x, y, z <= w`.

use crate::math::{Vec3, Vec4};

/// A projected point that still remembers where it came from in the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipVertex {
    /// Clip-space position, before the perspective divide.
    pub position: Vec4,
    pub world: Vec3,
}

impl ClipVertex {
    pub fn new(position: Vec4, world: Vec3) -> Self {
        Self { position, world }
    }

    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            world: self.world.lerp(other.world, t),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Axis {
    X,
    Y,
    Z,
}

/// One face of the view volume: `w + sign * axis >= 0` inside.
#[derive(Clone, Copy, Debug)]
struct Boundary {
    axis: Axis,
    sign: f32,
}

impl Boundary {
    const ALL: [Boundary; 6] = [
        Boundary { axis: Axis::X, sign: 1.0 },
        Boundary { axis: Axis::X, sign: -1.0 },
        Boundary { axis: Axis::Y, sign: 1.0 },
        Boundary { axis: Axis::Y, sign: -1.0 },
        Boundary { axis: Axis::Z, sign: 1.0 },
        Boundary { axis: Axis::Z, sign: -1.0 },
    ];

    #[inline]
    fn distance(&self, v: &ClipVertex) -> f32 {
        let p = v.position;
        let component = match self.axis {
            Axis::X => p.x,
            Axis::Y => p.y,
            Axis::Z => p.z,
        };
        p.w + self.sign * component
    }
}

/// Clips triangles and segments to the view volume.
///
/// Polygons are built in two scratch buffers that are reused across calls, so
/// clipping a mesh does not allocate per triangle.
#[derive(Debug, Clone, Default)]
pub struct ViewClipper {
    polygon: Vec<ClipVertex>,
    scratch: Vec<ClipVertex>,
}

impl ViewClipper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the convex polygon left of the triangle, empty when the
    /// triangle lies fully outside.
    pub fn clip_triangle(&mut self, triangle: [ClipVertex; 3]) -> &[ClipVertex] {
        self.polygon.clear();
        self.polygon.extend_from_slice(&triangle);

        for boundary in Boundary::ALL {
            if self.polygon.len() < 3 {
                break;
            }
            self.scratch.clear();
            for (i, current) in self.polygon.iter().enumerate() {
                let next = &self.polygon[(i + 1) % self.polygon.len()];
                let d0 = boundary.distance(current);
                let d1 = boundary.distance(next);
                if d0 >= 0.0 {
                    self.scratch.push(*current);
                }
                if (d0 >= 0.0) != (d1 >= 0.0) {
                    self.scratch.push(current.lerp(next, d0 / (d0 - d1)));
                }
            }
            std::mem::swap(&mut self.polygon, &mut self.scratch);
        }

        if self.polygon.len() < 3 {
            self.polygon.clear();
        }
        &self.polygon
    }

    /// Shrinks the segment's parameter range face by face. Returns `None` if
    /// nothing is left.
    pub fn clip_segment(&self, a: ClipVertex, b: ClipVertex) -> Option<(ClipVertex, ClipVertex)> {
        let (mut t0, mut t1) = (0.0f32, 1.0f32);
        for boundary in Boundary::ALL {
            let da = boundary.distance(&a);
            let db = boundary.distance(&b);
            match (da >= 0.0, db >= 0.0) {
                (true, true) => {}
                (false, false) => return None,
                (true, false) => t1 = t1.min(da / (da - db)),
                (false, true) => t0 = t0.max(da / (da - db)),
            }
            if t0 > t1 {
                return None;
            }
        }
        Some((a.lerp(&b, t0), a.lerp(&b, t1)))
    }
}

/// Splits a convex polygon into a triangle fan around its first vertex.
pub fn fan(polygon: &[ClipVertex]) -> impl Iterator<Item = [&ClipVertex; 3]> {
    (2..polygon.len()).map(move |i| [&polygon[0], &polygon[i - 1], &polygon[i]])
}
