//! A CPU-rendered STL viewer with movable clip planes and stencil caps.
//!
//! Models and plane objects live in an `objects` group of a [`scene::Scene`].
//! Turning clipping on derives one [`math::Plane`] per plane object and hands
//! the set to every model's material; the rasterizer discards fragments
//! behind the planes, and stencil caps fill the exposed cross-sections.
//! SDL2 is used only for window management and display.
//!
//! # Quick Start
//!
//! ```ignore
//! use clipview::prelude::*;
//!
//! let mut session = EditorSession::new(SessionSettings::default())?;
//! session.add_model("cube", Geometry::cuboid(1.0, 1.0, 1.0))?;
//! session.add_plane()?;
//! session.toggle_clipping()?;
//! ```

pub mod app;
pub mod camera;
pub mod clipping;
pub mod colors;
pub mod config;
pub mod controller;
pub mod editor;
pub mod engine;
pub mod light;
pub mod material;
pub mod math;
pub mod mesh;
pub mod panel;
pub mod projection;
pub mod raycast;
pub mod scene;
pub mod stl;
pub mod transform;
pub mod window;

// Internal modules - used within the crate only
pub(crate) mod clipper;
pub(crate) mod render;

pub use editor::{EditorError, EditorSession, SessionSettings};
pub use engine::{Engine, FrameStats};
pub use mesh::Geometry;
pub use stl::LoadError;

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use clipview::prelude::*;
/// ```
pub mod prelude {
    // Clipping
    pub use crate::clipping::{
        add_caps, build_cap_mesh, build_planes, build_stencil_group, ClipToggleController,
        PlaneRegistry,
    };

    // Editor
    pub use crate::controller::Controller;
    pub use crate::editor::{EditorSession, SessionSettings};
    pub use crate::panel::{Panel, PanelAction};

    // Scene
    pub use crate::material::{Material, Side};
    pub use crate::mesh::Geometry;
    pub use crate::scene::{Node, NodeId, NodeRole, Scene};
    pub use crate::transform::Transform;

    // Rendering
    pub use crate::camera::{OrbitCamera, OrbitCameraController};
    pub use crate::engine::Engine;
    pub use crate::light::Lighting;
    pub use crate::projection::Projection;

    // Math
    pub use crate::math::{Mat4, Plane, Vec3, Vec4};

    // Window & Input
    pub use crate::window::{FrameLimiter, InputState, Key, Window, WindowEvent};
}

/// Module exposing internals for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::render::{
        EdgeFunctionRasterizer, FlatShader, FragmentState, Renderer, ScreenVertex,
    };
}
