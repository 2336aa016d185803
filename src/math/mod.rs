//! Small linear algebra kit used by the scene graph, the clip planes and the
//! software rasterizer.

pub mod aabb;
pub mod mat4;
pub mod plane;
pub mod quat;
pub mod vec3;
pub mod vec4;

pub use aabb::Aabb;
pub use mat4::Mat4;
pub use plane::Plane;
pub use quat::Quat;
pub use vec3::Vec3;
pub use vec4::Vec4;
