//! Polygon clipping against the view volume.
//!
//! Triangles are clipped in homogeneous clip space (after projection, before
//! the perspective divide) with the Sutherland-Hodgman algorithm. The planes
//! are fixed, so nothing needs rebuilding when projection parameters change.
//!
//! This is unrelated to the user-placed clipping planes in
//! [`crate::clipping`], which are evaluated per fragment.

pub mod clip_space;

pub use clip_space::{fan, ClipVertex, ViewClipper};
