//! Triangle geometry shared between scene nodes.
//!
//! A [`Geometry`] is an indexed triangle list in the object's local space.
//! Meshes hold it behind an `Rc` so stencil passes can draw the very same
//! triangles as the object they cap.

use std::path::Path;

use crate::math::{Aabb, Vec3};
use crate::stl::{self, LoadError};

/// Indexed triangle geometry with a cached bounding box.
///
/// Triangles are wound counter-clockwise when seen from their front side
/// (right-hand rule), which is what STL files use for outward faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    positions: Vec<Vec3>,
    indices: Vec<[u32; 3]>,
    bounding_box: Option<Aabb>,
}

impl Geometry {
    /// Creates geometry from shared vertices and triangle indices.
    ///
    /// # Panics
    /// Panics in debug builds if an index is out of range.
    pub fn new(positions: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        debug_assert!(
            indices.iter().flatten().all(|&i| (i as usize) < positions.len()),
            "Triangle index out of range"
        );
        let bounding_box = Aabb::from_points(positions.iter().copied());
        Self {
            positions,
            indices,
            bounding_box,
        }
    }

    /// Creates non-indexed geometry from a triangle soup (one vertex per corner).
    pub fn from_triangles(triangles: Vec<[Vec3; 3]>) -> Self {
        let indices = (0..triangles.len() as u32)
            .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
            .collect();
        let positions = triangles.into_iter().flatten().collect();
        Self::new(positions, indices)
    }

    /// Loads an STL file (binary or ASCII).
    pub fn from_stl_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path)?;
        Self::from_stl_bytes(&bytes)
    }

    /// Parses STL data already in memory.
    pub fn from_stl_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let triangles = stl::parse(bytes)?;
        Ok(Self::from_triangles(triangles))
    }

    /// A `width` x `height` rectangle in the XY plane, centered at the origin,
    /// facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        Self::new(
            vec![
                Vec3::new(-hw, -hh, 0.0),
                Vec3::new(hw, -hh, 0.0),
                Vec3::new(hw, hh, 0.0),
                Vec3::new(-hw, hh, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    /// A closed box centered at the origin with outward-facing triangles.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vec3::new(width, height, depth) * 0.5;
        // Corner i takes +half on the axes whose bit is set (x=1, y=2, z=4).
        let positions = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 == 0 { -half.x } else { half.x },
                    if i & 2 == 0 { -half.y } else { half.y },
                    if i & 4 == 0 { -half.z } else { half.z },
                )
            })
            .collect();
        let indices = vec![
            // +Z
            [4, 5, 7],
            [4, 7, 6],
            // -Z
            [0, 2, 3],
            [0, 3, 1],
            // +X
            [1, 3, 7],
            [1, 7, 5],
            // -X
            [0, 4, 6],
            [0, 6, 2],
            // +Y
            [2, 6, 7],
            [2, 7, 3],
            // -Y
            [0, 1, 5],
            [0, 5, 4],
        ];
        Self::new(positions, indices)
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterates over the triangles' corner positions.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.iter().map(move |&[a, b, c]| {
            [
                self.positions[a as usize],
                self.positions[b as usize],
                self.positions[c as usize],
            ]
        })
    }

    /// Local-space bounding box, `None` when there are no vertices.
    pub fn bounding_box(&self) -> Option<Aabb> {
        self.bounding_box
    }

    /// Center of the bounding box (the origin for empty geometry).
    pub fn center(&self) -> Vec3 {
        self.bounding_box
            .map(|aabb| aabb.center())
            .unwrap_or(Vec3::ZERO)
    }
}
