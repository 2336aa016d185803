//! Software rendering back end: buffers, per-fragment tests and triangle
//! rasterization.

pub mod framebuffer;
pub mod rasterizer;
mod renderer;

pub use framebuffer::{FragmentState, FrameBuffer};
pub use rasterizer::{ClippedFlatShader, EdgeFunctionRasterizer, FlatShader, ScreenVertex};
pub use renderer::Renderer;
