//! Core rendering engine.
//!
//! The [`Engine`] struct is the main entry point for the renderer. It owns the
//! render targets and draws a [`Scene`] from a camera:
//!
//! 1. Visible meshes and lines are collected and stably sorted by render
//!    order, so ties keep scene traversal order.
//! 2. Each mesh triangle is moved to world space, tested for facing against
//!    the material's [`Side`], flat shaded, then projected and clipped to the
//!    view volume.
//! 3. Fragments are discarded by the material's clipping planes and go
//!    through the stencil and depth tests the material configures.
//!
//! The stencil buffer is cleared at the start of every frame and after any
//! mesh flagged `clear_stencil_after`.

use log::trace;

use crate::camera::OrbitCamera;
use crate::clipper::{fan, ClipVertex, ViewClipper};
use crate::colors;
use crate::light::Lighting;
use crate::material::Side;
use crate::math::{Mat4, Vec3, Vec4};
use crate::projection::Projection;
use crate::render::{
    ClippedFlatShader, EdgeFunctionRasterizer, FlatShader, FragmentState, FrameBuffer, Renderer,
    ScreenVertex,
};
use crate::scene::{LineData, MeshData, NodeId, NodeKind, Scene};

/// What one call to [`Engine::render`] drew.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub meshes: usize,
    pub lines: usize,
    /// Triangles that survived facing and view-volume tests.
    pub triangles: usize,
}

pub struct Engine {
    renderer: Renderer,
    rasterizer: EdgeFunctionRasterizer,
    clipper: ViewClipper,
    background: u32,
}

impl Engine {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            renderer: Renderer::new(width, height),
            rasterizer: EdgeFunctionRasterizer::new(),
            clipper: ViewClipper::new(),
            background: colors::BACKGROUND,
        }
    }

    pub fn set_background(&mut self, color: u32) {
        self.background = color;
    }

    pub fn background(&self) -> u32 {
        self.background
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    pub fn width(&self) -> u32 {
        self.renderer.width()
    }

    pub fn height(&self) -> u32 {
        self.renderer.height()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Returns the rendered frame as bytes (ARGB8888 format)
    pub fn frame_buffer(&self) -> &[u8] {
        self.renderer.as_bytes()
    }

    /// Returns the rendered frame as RGBA8 rows for image export.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.renderer.to_rgba()
    }

    /// Render `scene` as seen through `camera`.
    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &OrbitCamera,
        projection: &Projection,
        lighting: &Lighting,
    ) -> FrameStats {
        self.renderer.clear(self.background);
        self.renderer.clear_depth();
        self.renderer.clear_stencil();

        let view_proj = projection.matrix() * camera.view_matrix();
        let eye = camera.position();
        let mut stats = FrameStats::default();

        for id in draw_list(scene) {
            let Some(node) = scene.get(id) else {
                continue;
            };
            let world = scene.world_matrix(id);
            match &node.kind {
                NodeKind::Mesh(mesh) => {
                    stats.meshes += 1;
                    stats.triangles += self.draw_mesh(mesh, &world, &view_proj, eye, lighting);
                    if mesh.clear_stencil_after {
                        self.renderer.clear_stencil();
                    }
                }
                NodeKind::Line(line) => {
                    stats.lines += 1;
                    self.draw_line(line, &world, &view_proj);
                }
                NodeKind::Group => {}
            }
        }

        trace!(
            "frame: {} meshes, {} lines, {} triangles",
            stats.meshes,
            stats.lines,
            stats.triangles
        );
        stats
    }

    fn draw_mesh(
        &mut self,
        mesh: &MeshData,
        world: &Mat4,
        view_proj: &Mat4,
        eye: Vec3,
        lighting: &Lighting,
    ) -> usize {
        let material = &mesh.material;
        let state = FragmentState::from(material);
        let emissive = (material.emissive.x, material.emissive.y, material.emissive.z);
        // A mirroring transform reverses the winding of every face
        let mirrored = world.determinant3() < 0.0;

        let mut fb = self.renderer.as_framebuffer();
        let mut drawn = 0;

        for [a, b, c] in mesh.geometry.triangles() {
            let corners = [
                world.transform_point(a),
                world.transform_point(b),
                world.transform_point(c),
            ];
            let normal = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
            if normal.magnitude_squared() == 0.0 {
                continue;
            }

            // ─────────────────────────────────────────────────────────────
            // Facing
            // ─────────────────────────────────────────────────────────────
            let toward_eye = normal.dot(eye - corners[0]) > 0.0;
            let front = toward_eye != mirrored;
            let keep = match material.side {
                Side::Front => front,
                Side::Back => !front,
                Side::Double => true,
            };
            if !keep {
                continue;
            }

            // ─────────────────────────────────────────────────────────────
            // Flat shading, with the normal facing the viewer
            // ─────────────────────────────────────────────────────────────
            let color = if !state.color_write {
                0
            } else if material.lit {
                let facing = if toward_eye { normal } else { -normal };
                colors::shade(material.color, lighting.intensity(facing.normalize()), emissive)
            } else {
                colors::shade(material.color, 1.0, emissive)
            };

            // ─────────────────────────────────────────────────────────────
            // Projection and view-volume clipping
            // ─────────────────────────────────────────────────────────────
            let polygon = self
                .clipper
                .clip_triangle(corners.map(|p| ClipVertex::new(*view_proj * Vec4::point(p), p)));
            if polygon.is_empty() {
                continue;
            }
            drawn += 1;

            for triangle in fan(polygon) {
                let screen = triangle.map(|v| to_screen(v, &fb));
                if material.clipping_planes.is_empty() {
                    let shader = FlatShader::new(color);
                    self.rasterizer.fill_triangle(&screen, &mut fb, &state, &shader);
                } else {
                    let shader = ClippedFlatShader::new(color, material);
                    self.rasterizer.fill_triangle(&screen, &mut fb, &state, &shader);
                }
            }
        }
        drawn
    }

    fn draw_line(&mut self, line: &LineData, world: &Mat4, view_proj: &Mat4) {
        let [a, b] = [line.start, line.end].map(|p| {
            let world_point = world.transform_point(p);
            ClipVertex::new(*view_proj * Vec4::point(world_point), world_point)
        });
        let Some((a, b)) = self.clipper.clip_segment(a, b) else {
            return;
        };

        let mut fb = self.renderer.as_framebuffer();
        let pixel = |v: &ClipVertex, fb: &FrameBuffer| {
            let s = to_screen(v, fb).position;
            (s.x.floor() as i32, s.y.floor() as i32, s.z)
        };
        let (start, end) = (pixel(&a, &fb), pixel(&b, &fb));
        fb.draw_line(start, end, line.color, &FragmentState::default());
    }
}

/// Visible meshes and lines in drawing order.
fn draw_list(scene: &Scene) -> Vec<NodeId> {
    let mut items: Vec<(NodeId, f32)> = scene
        .descendants(scene.root())
        .into_iter()
        .filter(|&id| scene.is_visible(id))
        .filter_map(|id| {
            let node = scene.get(id)?;
            match node.kind {
                NodeKind::Group => None,
                _ => Some((id, node.render_order)),
            }
        })
        .collect();
    // sort_by is stable: equal render orders keep traversal order
    items.sort_by(|a, b| a.1.total_cmp(&b.1));
    items.into_iter().map(|(id, _)| id).collect()
}

/// Perspective divide and viewport transform. Screen y grows downwards.
#[inline]
fn to_screen(v: &ClipVertex, fb: &FrameBuffer) -> ScreenVertex {
    let inv_w = 1.0 / v.position.w;
    let ndc_x = v.position.x * inv_w;
    let ndc_y = v.position.y * inv_w;
    ScreenVertex {
        position: Vec3::new(
            (ndc_x + 1.0) * 0.5 * fb.width() as f32,
            (1.0 - ndc_y) * 0.5 * fb.height() as f32,
            inv_w,
        ),
        world: v.world,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use crate::math::Plane;
    use crate::mesh::Geometry;
    use crate::scene::Node;
    use crate::transform::Transform;
    use std::rc::Rc;

    const SIZE: u32 = 64;
    const GREEN: u32 = 0xFF00FF00;
    const RED: u32 = 0xFFFF0000;

    fn setup() -> (Engine, Scene, OrbitCamera, Projection) {
        let engine = Engine::new(SIZE, SIZE);
        let scene = Scene::new();
        let camera = OrbitCamera::default();
        let projection = Projection::from_degrees(50.0, 1.0, 0.1, 10.0);
        (engine, scene, camera, projection)
    }

    fn quad(material: Material, z: f32) -> Node {
        let mut transform = Transform::new();
        transform.set_position(Vec3::new(0.0, 1.6, z));
        Node::mesh("quad", Rc::new(Geometry::plane(2.0, 2.0)), material).with_transform(transform)
    }

    fn render(engine: &mut Engine, scene: &Scene, camera: &OrbitCamera, projection: &Projection) -> FrameStats {
        engine.render(scene, camera, projection, &Lighting::default())
    }

    #[test]
    fn empty_scene_is_background() {
        let (mut engine, scene, camera, projection) = setup();
        let stats = render(&mut engine, &scene, &camera, &projection);
        assert_eq!(stats, FrameStats::default());
        assert_eq!(engine.renderer().pixel(SIZE / 2, SIZE / 2), Some(colors::BACKGROUND));
    }

    #[test]
    fn unlit_quad_covers_the_center() {
        let (mut engine, mut scene, camera, projection) = setup();
        let root = scene.root();
        scene.add_child(root, quad(Material::basic(GREEN), 0.0)).unwrap();

        let stats = render(&mut engine, &scene, &camera, &projection);
        assert_eq!(stats.meshes, 1);
        assert_eq!(stats.triangles, 2);
        assert_eq!(engine.renderer().pixel(SIZE / 2, SIZE / 2), Some(GREEN));
        assert_eq!(engine.renderer().pixel(0, 0), Some(colors::BACKGROUND));
    }

    #[test]
    fn back_side_material_hides_front_faces() {
        let (mut engine, mut scene, camera, projection) = setup();
        let root = scene.root();
        let material = Material {
            side: Side::Back,
            ..Material::basic(GREEN)
        };
        scene.add_child(root, quad(material, 0.0)).unwrap();

        render(&mut engine, &scene, &camera, &projection);
        assert_eq!(engine.renderer().pixel(SIZE / 2, SIZE / 2), Some(colors::BACKGROUND));
    }

    #[test]
    fn nearer_quad_wins_regardless_of_order() {
        let (mut engine, mut scene, camera, projection) = setup();
        let root = scene.root();
        scene.add_child(root, quad(Material::basic(GREEN), 0.5)).unwrap();
        scene.add_child(root, quad(Material::basic(RED), 0.0)).unwrap();

        render(&mut engine, &scene, &camera, &projection);
        assert_eq!(engine.renderer().pixel(SIZE / 2, SIZE / 2), Some(GREEN));
    }

    #[test]
    fn clipping_plane_discards_one_half() {
        let (mut engine, mut scene, camera, projection) = setup();
        let root = scene.root();
        let material = Material {
            clipping_planes: vec![Plane::new(Vec3::X, 0.0)],
            ..Material::basic(GREEN)
        };
        scene.add_child(root, quad(material, 0.0)).unwrap();

        render(&mut engine, &scene, &camera, &projection);
        assert_eq!(engine.renderer().pixel(SIZE / 4, SIZE / 2), Some(colors::BACKGROUND));
        assert_eq!(engine.renderer().pixel(3 * SIZE / 4, SIZE / 2), Some(GREEN));
    }

    #[test]
    fn render_order_beats_traversal_order() {
        let (mut engine, mut scene, camera, projection) = setup();
        let root = scene.root();
        let mut late = Material::basic(RED);
        late.depth_test = false;
        scene
            .add_child(root, quad(late, 0.0).with_render_order(1.0))
            .unwrap();
        scene.add_child(root, quad(Material::basic(GREEN), 0.5)).unwrap();

        render(&mut engine, &scene, &camera, &projection);
        assert_eq!(engine.renderer().pixel(SIZE / 2, SIZE / 2), Some(RED));
    }

    #[test]
    fn hidden_parent_hides_children() {
        let (mut engine, mut scene, camera, projection) = setup();
        let root = scene.root();
        let group = scene.add_child(root, Node::group("group")).unwrap();
        scene.add_child(group, quad(Material::basic(GREEN), 0.0)).unwrap();
        scene.get_mut(group).unwrap().visible = false;

        let stats = render(&mut engine, &scene, &camera, &projection);
        assert_eq!(stats.meshes, 0);
    }

    #[test]
    fn lines_are_drawn() {
        let (mut engine, mut scene, camera, projection) = setup();
        let root = scene.root();
        scene
            .add_child(
                root,
                Node::line("line", Vec3::new(-1.0, 1.6, 0.0), Vec3::new(1.0, 1.6, 0.0), RED),
            )
            .unwrap();

        let stats = render(&mut engine, &scene, &camera, &projection);
        assert_eq!(stats.lines, 1);
        let row = SIZE / 2;
        assert!((0..SIZE).any(|x| engine.renderer().pixel(x, row) == Some(RED)
            || engine.renderer().pixel(x, row - 1) == Some(RED)));
    }
}
